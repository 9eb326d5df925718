//! Custom MiniJinja filters for code generation

use crate::{jsgen, util};
use minijinja::{Environment, Error, ErrorKind};

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("comment", comment);
    env.add_filter("jsify", jsify);
}

/// Continue a multi-line text as `//` comment lines, indented by `indent`
fn comment(value: &str, indent: Option<&str>) -> String {
    let indent = indent.unwrap_or_default();
    util::comment(value).replace('\n', &format!("\n{}", indent))
}

/// Identifier made out of a string, PascalCase when `upper`
fn jsify(value: &str, upper: Option<bool>) -> Result<String, Error> {
    jsgen::jsify(value, upper.unwrap_or(false))
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}
