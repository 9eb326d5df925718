//! Design model — the API description the client is generated from
//!
//! A [`Design`] holds resources with their actions and routes, user types,
//! media types and the transforms to generate. It is loaded once from YAML,
//! linked (named references resolved, link types synthesized, views
//! checked) and then only read by the renderers.
//!
//! ## Example Design
//!
//! ```yaml
//! name: skydive
//! host: localhost:9099
//! resources:
//!   - name: aircraft
//!     base_path: /aircrafts
//!     actions:
//!       - name: show
//!         routes: [{ verb: GET, path: "/:id" }]
//! types:
//!   AircraftForm:
//!     type:
//!       object:
//!         name: { type: string }
//! media_types:
//!   AircraftMedia:
//!     identifier: application/vnd.aircraft+json
//!     type:
//!       object:
//!         id: { type: integer }
//!         name: { type: string }
//!     views:
//!       link: { attributes: [name] }
//! ```

mod project;
mod types;

pub use project::Projection;
pub use types::{
    Attribute, DataType, Hash, Kind, MediaRef, Object, Primitive, DEFAULT_VIEW, FIELD_NAME_KEY,
    FIELD_TYPE_KEY, TRANSFORM_KEY,
};

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Identifier of the built-in error media type
pub const ERROR_MEDIA_IDENTIFIER: &str = "application/vnd.goa.error";

/// Type name of the built-in error media type
pub const ERROR_MEDIA_NAME: &str = "error";

/// Name of the view used for link attributes when none is given
pub const LINK_VIEW: &str = "link";

/// A complete API design
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "flowgen Design", description = "API design model")]
pub struct Design {
    /// API name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default host addressed by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Supported schemes, the first one is the client default
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    /// Path prefix of every route
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_path: String,

    /// Generator version this design was written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    /// User types by name
    #[serde(default)]
    pub types: BTreeMap<String, UserType>,

    /// Media types by type name
    #[serde(default)]
    pub media_types: BTreeMap<String, MediaType>,

    /// Transform functions to generate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformRequest>,
}

/// A REST resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_path: String,

    #[serde(default)]
    pub actions: Vec<Action>,
}

/// An action of a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub routes: Vec<Route>,

    /// Request body type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<DataType>,

    /// Query string parameters (an object)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Attribute>,
}

/// HTTP route of an action, relative to the resource base path
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Route {
    pub verb: String,
    #[serde(default)]
    pub path: String,
}

/// A named type
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserType {
    /// Filled from the registry key when the design is linked
    #[serde(skip)]
    pub type_name: String,

    #[serde(flatten)]
    pub attribute: Attribute,

    /// Set on the synthesized type holding the links of a media type
    #[serde(skip)]
    pub links_of: Option<String>,
}

/// A named type describing a response body
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaType {
    /// Filled from the registry key when the design is linked
    #[serde(skip)]
    pub type_name: String,

    /// Content type identifier
    pub identifier: String,

    #[serde(flatten)]
    pub attribute: Attribute,

    /// Named projections; a missing `default` view means all attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub views: BTreeMap<String, View>,

    /// Attributes exposed as links, with the view used to render them
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Link>,
}

/// A partial projection of a media type
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct View {
    #[serde(default)]
    pub attributes: Vec<String>,

    /// View used for attributes that are themselves media types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

/// A transform function to generate between two named types
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransformRequest {
    pub source: String,
    pub target: String,
    /// Function name, derived from the type names when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MediaType {
    /// The built-in error media type or the one a design declares in its place
    pub fn is_error(&self) -> bool {
        self.type_name == ERROR_MEDIA_NAME || self.identifier == ERROR_MEDIA_IDENTIFIER
    }

    /// View names in rendering order: `default` first, then by name
    pub fn view_names(&self) -> Vec<&str> {
        let mut names = vec![DEFAULT_VIEW];
        names.extend(
            self.views
                .keys()
                .map(String::as_str)
                .filter(|v| *v != DEFAULT_VIEW),
        );
        names
    }

    /// Name of the synthesized links type
    pub fn links_type_name(&self) -> String {
        format!("{}Links", self.type_name)
    }

    /// Name of the synthesized type holding the links of every element of
    /// a collection of this media type
    pub fn links_array_type_name(&self) -> String {
        format!("{}Array", self.links_type_name())
    }

    /// The built-in error media type
    pub fn error() -> Self {
        let field = |description: &str| Attribute::new(DataType::string()).with_description(description);
        let fields = DataType::object([
            (
                "id",
                field("a unique identifier for this particular occurrence of the problem."),
            ),
            (
                "status",
                field("the HTTP status code applicable to this problem, expressed as a string value."),
            ),
            (
                "code",
                field("an application-specific error code, expressed as a string value."),
            ),
            (
                "detail",
                field("a human-readable explanation specific to this occurrence of the problem."),
            ),
            (
                "meta",
                Attribute::new(DataType::hash_of(
                    DataType::string(),
                    DataType::Primitive(Primitive::Any),
                ))
                .with_description(
                    "a meta object containing non-standard meta-information about the error.",
                ),
            ),
        ]);
        Self {
            type_name: ERROR_MEDIA_NAME.to_string(),
            identifier: ERROR_MEDIA_IDENTIFIER.to_string(),
            attribute: Attribute::new(fields).with_description("Error response media type"),
            views: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }
}

impl Design {
    /// Parse and link a design from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut design: Design =
            serde_norway::from_str(yaml).map_err(|e| Error::DesignParse(e.to_string()))?;
        design.link()?;
        Ok(design)
    }

    /// Load a design file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize design to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::DesignParse(e.to_string()))
    }

    /// Compute design hash for provenance
    pub fn hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = self.to_yaml().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }

    pub fn user_type(&self, name: &str) -> Option<&UserType> {
        self.types.get(name)
    }

    pub fn media_type(&self, name: &str) -> Option<&MediaType> {
        self.media_types.get(name)
    }

    /// Reference to the user or media type called `name`
    pub fn named_type(&self, name: &str) -> Result<DataType> {
        if self.types.contains_key(name) {
            Ok(DataType::user(name))
        } else if self.media_types.contains_key(name) {
            Ok(DataType::media(name, None))
        } else {
            Err(unknown(name, "a transform request"))
        }
    }

    /// Resolve named references until a structural node is reached
    pub fn underlying<'a>(&'a self, t: &'a DataType) -> Result<&'a DataType> {
        let mut current = t;
        let mut seen = BTreeSet::new();
        loop {
            let name = match current {
                DataType::User(name) => name,
                DataType::Media(r) => &r.name,
                _ => return Ok(current),
            };
            if !seen.insert(name.as_str()) {
                return Err(Error::UnknownTypeKind {
                    name: name.clone(),
                    context: "a cycle of type aliases".into(),
                });
            }
            current = &self.named_attribute(current)?.data_type;
        }
    }

    /// Kind of a type, looking through named types
    pub fn kind(&self, t: &DataType) -> Result<Kind> {
        Ok(match self.underlying(t)? {
            DataType::Primitive(p) => Kind::Primitive(*p),
            DataType::Array(_) => Kind::Array,
            DataType::Hash(_) => Kind::Hash,
            DataType::Object(_) => Kind::Object,
            // underlying never stops on a named type
            DataType::User(_) | DataType::Media(_) => Kind::Object,
        })
    }

    /// Required fields carried by a named type
    pub fn required_of(&self, t: &DataType) -> Result<Vec<String>> {
        match t {
            DataType::User(_) | DataType::Media(_) => Ok(self.named_attribute(t)?.required.clone()),
            _ => Ok(Vec::new()),
        }
    }

    /// Attribute wrapped by a named type
    pub fn named_attribute(&self, t: &DataType) -> Result<&Attribute> {
        match t {
            DataType::User(name) => self
                .user_type(name)
                .map(|ut| &ut.attribute)
                .ok_or_else(|| unknown(name, "a user type reference")),
            DataType::Media(r) => self
                .media_type(&r.name)
                .map(|mt| &mt.attribute)
                .ok_or_else(|| unknown(&r.name, "a media type reference")),
            other => Err(unknown(&other.name(), "a named type lookup")),
        }
    }

    /// Media type of the elements of a collection media type
    pub fn element_media(&self, mt: &MediaType) -> Option<&MediaType> {
        let DataType::Array(elem) = &mt.attribute.data_type else {
            return None;
        };
        match &elem.data_type {
            DataType::Media(r) => self.media_type(&r.name),
            DataType::User(name) if !self.types.contains_key(name) => self.media_type(name),
            _ => None,
        }
    }

    /// Names of the user types synthesized for links, with the media type
    /// each one belongs to
    fn links_type_names(&self) -> Vec<(String, &MediaType)> {
        let mut names = Vec::new();
        for mt in self.media_types.values() {
            if !mt.links.is_empty() {
                names.push((mt.links_type_name(), mt));
            }
            if let Some(elem) = self.element_media(mt).filter(|e| !e.links.is_empty()) {
                names.push((elem.links_array_type_name(), mt));
            }
        }
        names
    }

    /// Resolve names, add the error media type, synthesize link types and
    /// check views.
    ///
    /// A design declaring its own `error` media type replaces the built-in
    /// one.
    pub fn link(&mut self) -> Result<()> {
        for (name, ut) in self.types.iter_mut() {
            ut.type_name = name.clone();
        }
        for (name, mt) in self.media_types.iter_mut() {
            mt.type_name = name.clone();
        }
        self.media_types
            .entry(ERROR_MEDIA_NAME.to_string())
            .or_insert_with(MediaType::error);

        let mut users: BTreeSet<String> = self.types.keys().cloned().collect();
        for (name, mt) in self.links_type_names() {
            if !users.insert(name.clone()) {
                return Err(Error::DuplicateTypeName {
                    name,
                    reason: format!("the name of the links type of {} is already in use", mt.type_name),
                });
            }
        }
        let media: BTreeSet<String> = self.media_types.keys().cloned().collect();
        let names = Names {
            users: &users,
            media: &media,
        };

        for (name, ut) in self.types.iter_mut() {
            names.link(&mut ut.attribute.data_type, &format!("types.{}", name))?;
        }
        for (name, mt) in self.media_types.iter_mut() {
            names.link(&mut mt.attribute.data_type, &format!("media_types.{}", name))?;
        }
        for res in self.resources.iter_mut() {
            for action in res.actions.iter_mut() {
                let ctx = format!("{}.{}", res.name, action.name);
                if let Some(payload) = action.payload.as_mut() {
                    names.link(payload, &format!("{} payload", ctx))?;
                }
                if let Some(params) = action.params.as_mut() {
                    names.link(&mut params.data_type, &format!("{} params", ctx))?;
                }
            }
        }

        self.synthesize_links()?;
        self.check_views()
    }

    fn synthesize_links(&mut self) -> Result<()> {
        let mut synthesized = Vec::new();
        for mt in self.media_types.values().filter(|mt| !mt.links.is_empty()) {
            let DataType::Object(fields) = &mt.attribute.data_type else {
                return Err(Error::InvalidView {
                    media: mt.type_name.clone(),
                    view: "links".into(),
                    reason: "only object media types can declare links".into(),
                });
            };
            let mut links = Object::new();
            for (name, link) in &mt.links {
                let target = match fields.get(name).map(|a| &a.data_type) {
                    Some(DataType::Media(r)) => r.name.clone(),
                    _ => {
                        return Err(Error::InvalidView {
                            media: mt.type_name.clone(),
                            view: "links".into(),
                            reason: format!("link {} is not a media type attribute", name),
                        })
                    }
                };
                let view = link.view.clone().unwrap_or_else(|| LINK_VIEW.to_string());
                let has_view = view == DEFAULT_VIEW
                    || self
                        .media_types
                        .get(&target)
                        .is_some_and(|linked| linked.views.contains_key(&view));
                if !has_view {
                    return Err(Error::InvalidView {
                        media: target,
                        view,
                        reason: format!("used by link {} of {}", name, mt.type_name),
                    });
                }
                links.insert(
                    name.clone(),
                    Attribute::new(DataType::media(target, Some(&view))),
                );
            }
            synthesized.push(UserType {
                type_name: mt.links_type_name(),
                attribute: Attribute::new(DataType::Object(links)),
                links_of: Some(mt.type_name.clone()),
            });
        }
        for mt in self.media_types.values() {
            let Some(elem) = self.element_media(mt).filter(|e| !e.links.is_empty()) else {
                continue;
            };
            synthesized.push(UserType {
                type_name: elem.links_array_type_name(),
                attribute: Attribute::new(DataType::array_of(DataType::user(elem.links_type_name()))),
                links_of: Some(mt.type_name.clone()),
            });
        }
        for ut in synthesized {
            self.types.insert(ut.type_name.clone(), ut);
        }
        Ok(())
    }

    fn check_views(&self) -> Result<()> {
        for mt in self.media_types.values() {
            for view in mt.view_names() {
                self.project(mt, view)?;
            }
        }
        Ok(())
    }
}

fn unknown(name: &str, context: &str) -> Error {
    Error::UnknownTypeKind {
        name: name.to_string(),
        context: context.to_string(),
    }
}

/// Known type names used while linking references
struct Names<'a> {
    users: &'a BTreeSet<String>,
    media: &'a BTreeSet<String>,
}

impl Names<'_> {
    fn link(&self, t: &mut DataType, ctx: &str) -> Result<()> {
        match t {
            DataType::Primitive(_) => Ok(()),
            DataType::Array(elem) => self.link(&mut elem.data_type, &format!("{}[]", ctx)),
            DataType::Hash(hash) => {
                self.link(&mut hash.key.data_type, &format!("{}{{key}}", ctx))?;
                self.link(&mut hash.elem.data_type, &format!("{}{{elem}}", ctx))
            }
            DataType::Object(fields) => {
                for (name, att) in fields.iter_mut() {
                    self.link(&mut att.data_type, &format!("{}.{}", ctx, name))?;
                }
                Ok(())
            }
            DataType::User(name) => {
                if self.users.contains(name.as_str()) {
                    return Ok(());
                }
                if !self.media.contains(name.as_str()) {
                    return Err(unknown(name, ctx));
                }
                let media = DataType::media(name.clone(), None);
                *t = media;
                Ok(())
            }
            DataType::Media(r) => {
                if self.media.contains(&r.name) {
                    Ok(())
                } else {
                    Err(unknown(&r.name, ctx))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESIGN: &str = r#"
name: test
host: localhost:8080
types:
  Address:
    type:
      object:
        city: { type: string }
        owner: { type: UserMedia }
  Loop:
    type:
      object:
        next: { type: Loop }
media_types:
  UserMedia:
    identifier: application/vnd.user+json
    type:
      object:
        id: { type: integer }
        home: { type: Address }
"#;

    #[test]
    fn test_link_resolves_media_references() {
        let design = Design::from_yaml(DESIGN).unwrap();
        let DataType::Object(fields) = &design.types["Address"].attribute.data_type else {
            panic!("expected object");
        };
        assert_eq!(fields["owner"].data_type, DataType::media("UserMedia", None));
        assert_eq!(design.types["Address"].type_name, "Address");
    }

    #[test]
    fn test_error_media_is_always_present() {
        let design = Design::from_yaml(DESIGN).unwrap();
        let err = design.media_type(ERROR_MEDIA_NAME).unwrap();
        assert!(err.is_error());
    }

    #[test]
    fn test_unknown_reference_is_a_defect() {
        let err = Design::from_yaml(
            r#"
name: broken
types:
  A:
    type: { object: { b: { type: Missing } } }
"#,
        )
        .unwrap_err();
        assert!(err.is_defect());
        assert!(err.to_string().contains("types.A.b"));
    }

    #[test]
    fn test_kind_looks_through_named_types() {
        let design = Design::from_yaml(DESIGN).unwrap();
        assert_eq!(design.kind(&DataType::user("Loop")).unwrap(), Kind::Object);
        assert_eq!(
            design.kind(&DataType::media("UserMedia", None)).unwrap(),
            Kind::Object
        );
        assert_eq!(
            design.kind(&DataType::string()).unwrap(),
            Kind::Primitive(Primitive::String)
        );
    }

    #[test]
    fn test_alias_cycle_is_reported() {
        let design = Design::from_yaml(
            r#"
name: aliases
types:
  A: { type: B }
  B: { type: A }
"#,
        )
        .unwrap();
        assert!(design.kind(&DataType::user("A")).is_err());
    }

    #[test]
    fn test_named_type_lookup() {
        let design = Design::from_yaml(DESIGN).unwrap();
        assert_eq!(design.named_type("Address").unwrap(), DataType::user("Address"));
        assert_eq!(
            design.named_type("UserMedia").unwrap(),
            DataType::media("UserMedia", None)
        );
        assert!(design.named_type("Nope").unwrap_err().is_defect());
    }

    #[test]
    fn test_hash_is_stable() {
        let a = Design::from_yaml(DESIGN).unwrap();
        let b = Design::from_yaml(DESIGN).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert!(a.hash().starts_with("sha256:"));
    }

    #[test]
    fn test_links_type_synthesized() {
        let design = Design::from_yaml(
            r#"
name: links
media_types:
  LocationMedia:
    identifier: application/vnd.location+json
    type: { object: { id: { type: integer }, href: { type: string } } }
    views:
      link: { attributes: [href] }
  DropzoneMedia:
    identifier: application/vnd.dropzone+json
    type:
      object:
        name: { type: string }
        location: { type: LocationMedia }
    links:
      location: {}
    views:
      default: { attributes: [name, location, links] }
"#,
        )
        .unwrap();
        let links = design.user_type("DropzoneMediaLinks").unwrap();
        assert_eq!(links.links_of.as_deref(), Some("DropzoneMedia"));
        let DataType::Object(fields) = &links.attribute.data_type else {
            panic!("expected object");
        };
        assert_eq!(
            fields["location"].data_type,
            DataType::media("LocationMedia", Some("link"))
        );
    }

    const LINKED: &str = r#"
  LocationMedia:
    identifier: application/vnd.location+json
    type: { object: { id: { type: integer }, href: { type: string } } }
    views:
      link: { attributes: [href] }
  DropzoneMedia:
    identifier: application/vnd.dropzone+json
    type:
      object:
        name: { type: string }
        location: { type: LocationMedia }
    links:
      location: {}
"#;

    #[test]
    fn test_links_array_type_synthesized_for_collections() {
        let yaml = format!(
            "name: links\nmedia_types:{}  DropzoneMediaCollection:\n    identifier: application/vnd.dropzone+json; type=collection\n    type: {{ array: {{ type: DropzoneMedia }} }}\n",
            LINKED
        );
        let design = Design::from_yaml(&yaml).unwrap();
        let array = design.user_type("DropzoneMediaLinksArray").unwrap();
        assert_eq!(array.links_of.as_deref(), Some("DropzoneMediaCollection"));
        assert_eq!(
            array.attribute.data_type,
            DataType::array_of(DataType::user("DropzoneMediaLinks"))
        );
    }

    #[test]
    fn test_links_type_name_clash_is_rejected() {
        let yaml = format!(
            "name: clash\ntypes:\n  DropzoneMediaLinks:\n    type: {{ object: {{ self: {{ type: string }} }} }}\nmedia_types:{}",
            LINKED
        );
        let err = Design::from_yaml(&yaml).unwrap_err();
        let Error::DuplicateTypeName { name, reason } = &err else {
            panic!("unexpected error: {}", err);
        };
        assert_eq!(name, "DropzoneMediaLinks");
        assert!(reason.contains("DropzoneMedia"));
        assert!(!err.is_defect());
    }

    #[test]
    fn test_declared_error_media_replaces_builtin() {
        let design = Design::from_yaml(
            r#"
name: errors
media_types:
  error:
    identifier: application/vnd.problem+json
    type: { object: { title: { type: string } } }
"#,
        )
        .unwrap();
        let err = design.media_type(ERROR_MEDIA_NAME).unwrap();
        assert_eq!(err.identifier, "application/vnd.problem+json");
        assert!(err.is_error());
    }
}
