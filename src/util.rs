//! Shared utility functions
//!
//! Small string helpers used by the renderers and the templates.

use regex::Regex;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"))
}

/// Whether `s` can be used as a bare JavaScript property name
///
/// # Examples
/// ```
/// use flowgen::util::is_identifier;
/// assert!(is_identifier("avg_ceiling"));
/// assert!(!is_identifier("content-type"));
/// ```
pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

/// Property key as written in an object type literal
///
/// # Examples
/// ```
/// use flowgen::util::property_key;
/// assert_eq!(property_key("name"), "name");
/// assert_eq!(property_key("x-rate"), "\"x-rate\"");
/// ```
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Expression reading property `name` of `ctx`
///
/// # Examples
/// ```
/// use flowgen::util::property_access;
/// assert_eq!(property_access("source", "city"), "source.city");
/// assert_eq!(property_access("source", "zip-code"), "source[\"zip-code\"]");
/// ```
pub fn property_access(ctx: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{}.{}", ctx, name)
    } else {
        format!("{}[{}]", ctx, quote(name))
    }
}

/// Keep a possibly multi-line text inside a `//` comment block
pub fn comment(text: &str) -> String {
    text.trim_end().replace('\n', "\n// ")
}

/// Uppercase the first letter of every word
///
/// # Examples
/// ```
/// use flowgen::util::title;
/// assert_eq!(title("jump group"), "Jump Group");
/// assert_eq!(title("dropzone"), "Dropzone");
/// ```
pub fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if at_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_start = !c.is_alphanumeric();
    }
    out
}

fn quote(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name))
}
