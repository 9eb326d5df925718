//! Template context structures
//!
//! Converts the design and the rendered type fragments into the plain data
//! the client templates iterate over.

use crate::design::{Action, DataType, Design, MediaType, Resource, UserType};
use crate::error::{Error, Result};
use crate::jsgen::{jsify, TypeMapper};
use crate::util::{property_key, title};
use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn route_param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:*]([A-Za-z0-9_]+)").expect("valid route regex"))
}

/// Context for the client module template
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    /// Provenance header, when enabled
    pub provenance: Option<Provenance>,
    /// API description
    pub description: Option<String>,
    pub scheme: String,
    pub host: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u128,
    /// Request methods, grouped by action name
    pub actions: Vec<ActionView>,
    /// Type declarations in output order
    pub declarations: Vec<DeclarationView>,
    /// Rendered transform functions
    pub transforms: Vec<String>,
}

/// Provenance header data
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    /// Design file the module was generated from
    pub source: String,
    /// Design hash
    pub hash: String,
    /// Generation timestamp
    pub generated_at: String,
}

impl Provenance {
    pub fn new(source: &str, design: &Design) -> Self {
        Self {
            source: source.to_string(),
            hash: design.hash(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// View of one client request method
#[derive(Debug, Clone, Serialize)]
pub struct ActionView {
    /// Method name, e.g. `showAircraft`
    pub name: String,
    /// Parameters of the path builder
    pub path_params: Vec<String>,
    /// JS expression building the request path
    pub path: String,
    pub description: String,
    /// Payload type name
    pub payload: Option<String>,
    /// Query string parameters as `name: type`
    pub params: Vec<String>,
    /// Parameters of the request method
    pub signature: Vec<String>,
    /// Lowercase HTTP verb
    pub method: String,
}

impl ActionView {
    /// View of an action; `None` when the action has no route
    pub fn from_action(
        mapper: &TypeMapper<'_>,
        resource: &Resource,
        action: &Action,
    ) -> Result<Option<Self>> {
        let Some(route) = action.routes.first() else {
            return Ok(None);
        };
        let design = mapper.design();
        let name = jsify(&format!("{}{}", action.name, title(&resource.name)), false)?;
        let full = full_path(&[&design.base_path, &resource.base_path], &route.path);

        let path_params = route_params(&full)
            .iter()
            .map(|p| Ok(format!("{}: number|string", jsify(p, false)?)))
            .collect::<Result<Vec<_>>>()?;

        let payload = match &action.payload {
            Some(t) => Some(mapper.type_name(t, &design.required_of(t)?, 1, false)?),
            None => None,
        };

        let mut params = Vec::new();
        if let Some(att) = &action.params {
            let DataType::Object(fields) = design.underlying(&att.data_type)? else {
                return Err(Error::Other(format!(
                    "query parameters of {} must be an object",
                    name
                )));
            };
            for (field, fatt) in fields {
                params.push(format!(
                    "{}: {}",
                    property_key(field),
                    mapper.type_name(&fatt.data_type, &fatt.required, 1, false)?
                ));
            }
            params.sort();
        }

        let mut signature = vec!["path: string".to_string()];
        if let Some(payload) = &payload {
            signature.push(format!("data: {}", payload));
        }
        if !params.is_empty() {
            signature.push(format!("query: {{{}}}", params.join(", ")));
        }
        signature.push("config?: Object".to_string());

        let description = match action.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.trim_end().to_string(),
            _ => format!(
                "{} calls the {} action of the {} resource.",
                name, action.name, resource.name
            ),
        };

        Ok(Some(Self {
            path: js_path(&full)?,
            name,
            path_params,
            description,
            payload,
            params,
            signature,
            method: route.verb.to_lowercase(),
        }))
    }
}

/// View of one `export type` declaration
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationView {
    pub description: String,
    /// Media type identifier, including the view parameter
    pub identifier: Option<String>,
    pub name: String,
    pub definition: String,
}

impl DeclarationView {
    /// Declaration of a media type seen through `view`
    pub fn media(mapper: &TypeMapper<'_>, mt: &MediaType, view: &str) -> Result<Self> {
        let p = mapper.design().project(mt, view)?;
        Ok(Self {
            description: mapper.describe(&p.reference, true)?,
            identifier: Some(p.identifier),
            name: mapper.type_name(&p.reference, &p.attribute.required, 0, false)?,
            definition: mapper.type_def(&p.attribute, 0, true, false)?,
        })
    }

    /// Declaration of a user type
    pub fn user(mapper: &TypeMapper<'_>, ut: &UserType) -> Result<Self> {
        let reference = DataType::user(ut.type_name.clone());
        Ok(Self {
            description: mapper.describe(&reference, true)?,
            identifier: None,
            name: mapper.type_name(&reference, &ut.attribute.required, 0, false)?,
            definition: mapper.type_def(&ut.attribute, 0, true, false)?,
        })
    }
}

/// Join base paths and a route path. A route starting with `//` ignores
/// the base paths.
pub fn full_path(bases: &[&str], route: &str) -> String {
    if let Some(absolute) = route.strip_prefix("//") {
        return format!("/{}", absolute);
    }
    let mut out = String::new();
    for part in bases.iter().copied().chain(std::iter::once(route)) {
        let part = part.trim_matches('/');
        if !part.is_empty() {
            out.push('/');
            out.push_str(part);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Names of the wildcards of a route path
pub fn route_params(path: &str) -> Vec<String> {
    route_param_re()
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// JS expression building `path` from the path builder parameters
pub fn js_path(path: &str) -> Result<String> {
    let mut out = String::from("'");
    let mut last = 0;
    for caps in route_param_re().captures_iter(path) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&path[last..m.start()].replace('\'', "\\'"));
        out.push_str("'+");
        out.push_str(&jsify(&caps[1], false)?);
        out.push_str("+'");
        last = m.end();
    }
    out.push_str(&path[last..].replace('\'', "\\'"));
    out.push('\'');
    Ok(match out.strip_suffix("+''") {
        Some(trimmed) => trimmed.to_string(),
        None => out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsgen::RenderConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&["", "/aircrafts"], "", "/aircrafts")]
    #[case(&["/api", "/aircrafts"], "/:id", "/api/aircrafts/:id")]
    #[case(&["/api", "/aircrafts"], "//health", "/health")]
    #[case(&["", ""], "", "/")]
    fn test_full_path(#[case] bases: &[&str], #[case] route: &str, #[case] expected: &str) {
        assert_eq!(full_path(bases, route), expected);
    }

    #[rstest]
    #[case("/aircrafts", "'/aircrafts'")]
    #[case("/aircrafts/:id", "'/aircrafts/'+id")]
    #[case("/dz/:dz_id/loads/:load_id/x", "'/dz/'+dzID+'/loads/'+loadID+'/x'")]
    #[case("/files/*path", "'/files/'+path")]
    fn test_js_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(js_path(path).unwrap(), expected);
    }

    #[test]
    fn test_route_params() {
        assert_eq!(route_params("/a/:b/c/*d"), vec!["b", "d"]);
        assert!(route_params("/plain").is_empty());
    }

    fn design() -> Design {
        Design::from_yaml(
            r#"
name: actions
base_path: /api
resources:
  - name: aircraft
    base_path: /aircrafts
    actions:
      - name: list
        routes: [{ verb: GET, path: "" }]
        params:
          type:
            object:
              limit: { type: integer }
              kind: { type: string }
      - name: update
        description: Update an aircraft
        routes: [{ verb: PUT, path: "/:aircraft_id" }]
        payload: AircraftForm
      - name: orphan
types:
  AircraftForm:
    type: { object: { name: { type: string } } }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_action_views() {
        let d = design();
        let config = RenderConfig::default();
        let mapper = TypeMapper::new(&d, &config);
        let res = &d.resources[0];

        let list = ActionView::from_action(&mapper, res, &res.actions[0])
            .unwrap()
            .unwrap();
        assert_eq!(list.name, "listAircraft");
        assert_eq!(list.path, "'/api/aircrafts'");
        assert_eq!(list.params, vec!["kind: string", "limit: number"]);
        assert_eq!(
            list.signature,
            vec!["path: string", "query: {kind: string, limit: number}", "config?: Object"]
        );
        assert_eq!(list.method, "get");
        assert_eq!(
            list.description,
            "listAircraft calls the list action of the aircraft resource."
        );

        let update = ActionView::from_action(&mapper, res, &res.actions[1])
            .unwrap()
            .unwrap();
        assert_eq!(update.path_params, vec!["aircraftID: number|string"]);
        assert_eq!(update.path, "'/api/aircrafts/'+aircraftID");
        assert_eq!(update.payload.as_deref(), Some("AircraftForm"));
        assert_eq!(update.description, "Update an aircraft");

        assert!(ActionView::from_action(&mapper, res, &res.actions[2])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_user_declaration() {
        let d = design();
        let config = RenderConfig::default();
        let mapper = TypeMapper::new(&d, &config);
        let decl = DeclarationView::user(&mapper, d.user_type("AircraftForm").unwrap()).unwrap();
        assert_eq!(decl.name, "AircraftForm");
        assert_eq!(decl.description, "AircraftForm user type.");
        assert_eq!(decl.definition, "{\n  name: string,\n}");
        assert!(decl.identifier.is_none());
    }

    #[test]
    fn test_error_media_declaration() {
        let d = design();
        let config = RenderConfig::default();
        let mapper = TypeMapper::new(&d, &config);
        let mt = d.media_type("error").unwrap();
        let decl = DeclarationView::media(&mapper, mt, "default").unwrap();
        assert_eq!(decl.name, "error");
        assert_eq!(
            decl.identifier.as_deref(),
            Some("application/vnd.goa.error; view=default")
        );
        assert!(decl.definition.contains("  meta: {[string]: any},\n"));
        assert!(decl.definition.starts_with("{\n  // an application-specific error code"));
    }
}
