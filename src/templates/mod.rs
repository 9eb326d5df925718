//! Template-based code generation
//!
//! The fixed parts of the client module (request plumbing, method shells,
//! declaration headers) are MiniJinja templates compiled into the binary;
//! the generated fragments come from [`crate::jsgen`].

pub mod context;
pub mod filters;

use crate::error::Result;
use minijinja::{AutoEscape, Environment};
use std::sync::OnceLock;

pub use context::{ActionView, ClientContext, DeclarationView, Provenance};

// Embedded templates (compiled into binary)
mod embedded {
    pub const CLIENT_MODULE: &str = include_str!("../../templates/client/module.jinja");
    pub const CLIENT_ACTION: &str = include_str!("../../templates/client/action.jinja");
    pub const TYPE_DECLARATION: &str = include_str!("../../templates/types/declaration.jinja");
}

/// Name of the template rendering `js/client.js`
pub const CLIENT_TEMPLATE: &str = "client/module.jinja";

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

/// Initialize the template engine with embedded templates
fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    filters::register_filters(&mut env);

    env.add_template(CLIENT_TEMPLATE, embedded::CLIENT_MODULE)
        .expect("Failed to load client module template");
    env.add_template("client/action.jinja", embedded::CLIENT_ACTION)
        .expect("Failed to load client action template");
    env.add_template("types/declaration.jinja", embedded::TYPE_DECLARATION)
        .expect("Failed to load type declaration template");

    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Render the client module
pub fn render_client(ctx: &ClientContext) -> Result<String> {
    let template = engine().get_template(CLIENT_TEMPLATE)?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn empty_client() -> ClientContext {
        ClientContext {
            provenance: None,
            description: None,
            scheme: "https".into(),
            host: "api.example.com".into(),
            timeout_ms: 20000,
            actions: Vec::new(),
            declarations: Vec::new(),
            transforms: Vec::new(),
        }
    }

    fn show_action() -> ActionView {
        ActionView {
            name: "showAircraft".into(),
            path_params: vec!["id: number|string".into()],
            path: "'/aircrafts/'+id".into(),
            description: "Show an aircraft".into(),
            payload: None,
            params: vec!["full: boolean".into()],
            signature: vec![
                "path: string".into(),
                "query: {full: boolean}".into(),
                "config?: Object".into(),
            ],
            method: "get".into(),
        }
    }

    #[test]
    fn test_engine_initialization() {
        let env = engine();
        assert!(env.get_template(CLIENT_TEMPLATE).is_ok());
        assert!(env.get_template("client/action.jinja").is_ok());
        assert!(env.get_template("types/declaration.jinja").is_ok());
    }

    #[test]
    fn test_module_frame() {
        let code = render_client(&empty_client()).unwrap();
        assert!(code.starts_with("// @flow\n\nimport queryString from 'query-string'\n"));
        assert!(code.contains("this.scheme = scheme || 'https'"));
        assert!(code.contains("this.host = host || 'api.example.com'"));
        assert!(code.contains("this.timeout = timeout || 20000"));
        assert!(code.ends_with("    return timeoutPromise(cfg.timeout, reqp)\n  }\n}\n\nexport default Client\n"));
        assert!(!code.contains("GENERATED FROM"));
    }

    #[test]
    fn test_provenance_header() {
        let mut ctx = empty_client();
        ctx.provenance = Some(Provenance {
            source: "design.yaml".into(),
            hash: "sha256:0011223344556677".into(),
            generated_at: "2026-01-01T00:00:00+00:00".into(),
        });
        let code = render_client(&ctx).unwrap();
        assert!(code.starts_with("// GENERATED FROM: design.yaml\n// DESIGN HASH: sha256:0011223344556677\n"));
    }

    #[test]
    fn test_action_method() {
        let mut ctx = empty_client();
        ctx.actions.push(show_action());
        let code = render_client(&ctx).unwrap();
        let expected = r#"
  // showAircraftPath builds URL path for showAircraft
  showAircraftPath(id: number|string) {
    return '/aircrafts/'+id
  }

  // Show an aircraft
  // full: boolean is used to build the request query string.
  // config is an optional object to be merged into the config built by the function prior to making the request.
  // This function returns a promise which raises an error if the HTTP response is a 4xx or 5xx.
  showAircraft(path: string, query: {full: boolean}, config?: Object) {
    let cfg = {
      method: 'get',
    }
    if (config) {
      Object.assign(cfg, config)
    }
    path += '?' + queryString.stringify(query)
    return this.request(path, cfg)
  }
}
"#;
        assert!(code.contains(expected), "unexpected action rendering:\n{}", code);
    }

    #[test]
    fn test_declarations_and_transforms() {
        let mut ctx = empty_client();
        ctx.declarations.push(DeclarationView {
            description: "Aircraft media type.".into(),
            identifier: Some("application/vnd.aircraft+json; view=default".into()),
            name: "Aircraft".into(),
            definition: "{\n  id: number,\n}".into(),
        });
        ctx.declarations.push(DeclarationView {
            description: "Form user type.".into(),
            identifier: None,
            name: "Form".into(),
            definition: "{\n  name: string,\n}".into(),
        });
        ctx.transforms
            .push("export function f(source: Form): Form {\n  let target\n  return target\n}\n".into());
        let code = render_client(&ctx).unwrap();
        let expected = "}\n\n// Aircraft media type.\n// Identifier: application/vnd.aircraft+json; view=default\nexport type Aircraft = {\n  id: number,\n}\n\n// Form user type.\nexport type Form = {\n  name: string,\n}\n\nexport function f(source: Form): Form {\n  let target\n  return target\n}\n\nexport default Client\n";
        assert!(code.ends_with(expected), "unexpected tail:\n{}", code);
    }
}
