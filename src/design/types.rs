//! Type graph nodes
//!
//! A [`DataType`] is a closed sum over the kinds the renderers understand.
//! Named types are referenced by name and resolved through the
//! [`Design`](super::Design) registry, so a graph with named cycles is
//! still a finite tree of values.
//!
//! ## YAML form
//!
//! ```yaml
//! type: string                                  # primitive
//! type: Address                                 # user or media type
//! type: { array: { type: integer } }
//! type: { hash: { key: { type: string }, elem: { type: any } } }
//! type: { object: { city: { type: string } } }
//! type: { media: DropzoneMedia, view: link }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Metadata forcing the rendered type spelling of an attribute
pub const FIELD_TYPE_KEY: &str = "struct:field:type";

/// Metadata overriding the rendered name of an attribute
pub const FIELD_NAME_KEY: &str = "struct:field:name";

/// Metadata holding the key used to match attributes in transforms
pub const TRANSFORM_KEY: &str = "transform:key";

/// Name of the view every media type has
pub const DEFAULT_VIEW: &str = "default";

/// Object fields, iterated in lexicographic order
pub type Object = BTreeMap<String, Attribute>;

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
    DateTime,
    Uuid,
    Any,
}

impl Primitive {
    /// Parse a primitive type name as written in a design
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" | "bool" => Some(Primitive::Boolean),
            "integer" | "int" => Some(Primitive::Integer),
            "number" | "float" => Some(Primitive::Number),
            "string" => Some(Primitive::String),
            "datetime" | "date-time" | "timestamp" => Some(Primitive::DateTime),
            "uuid" => Some(Primitive::Uuid),
            "any" => Some(Primitive::Any),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::DateTime => "datetime",
            Primitive::Uuid => "uuid",
            Primitive::Any => "any",
        }
    }
}

/// Structural category of a type once named types are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Primitive(Primitive),
    Array,
    Hash,
    Object,
}

impl Kind {
    pub fn is_primitive(self) -> bool {
        matches!(self, Kind::Primitive(_))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Primitive(p) => write!(f, "{}", p.name()),
            Kind::Array => write!(f, "array"),
            Kind::Hash => write!(f, "hash"),
            Kind::Object => write!(f, "object"),
        }
    }
}

/// A node of the type graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TypeSpec", into = "TypeSpec")]
pub enum DataType {
    Primitive(Primitive),
    Array(Box<Attribute>),
    Hash(Box<Hash>),
    Object(Object),
    /// Reference to a user type by name
    User(String),
    /// Reference to a media type, optionally through a view
    Media(MediaRef),
}

/// Key and element attributes of a hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hash {
    pub key: Attribute,
    pub elem: Attribute,
}

/// Reference to a media type rendered through a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl MediaRef {
    pub fn view(&self) -> &str {
        self.view.as_deref().unwrap_or(DEFAULT_VIEW)
    }

    pub fn is_default_view(&self) -> bool {
        self.view() == DEFAULT_VIEW
    }
}

impl DataType {
    pub fn string() -> Self {
        DataType::Primitive(Primitive::String)
    }

    pub fn integer() -> Self {
        DataType::Primitive(Primitive::Integer)
    }

    pub fn array_of(elem: DataType) -> Self {
        DataType::Array(Box::new(Attribute::new(elem)))
    }

    pub fn hash_of(key: DataType, elem: DataType) -> Self {
        DataType::Hash(Box::new(Hash {
            key: Attribute::new(key),
            elem: Attribute::new(elem),
        }))
    }

    /// Build an anonymous object from `(field, attribute)` pairs
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Attribute)>,
        S: Into<String>,
    {
        DataType::Object(fields.into_iter().map(|(n, a)| (n.into(), a)).collect())
    }

    pub fn user(name: impl Into<String>) -> Self {
        DataType::User(name.into())
    }

    pub fn media(name: impl Into<String>, view: Option<&str>) -> Self {
        DataType::Media(MediaRef {
            name: name.into(),
            view: view.map(str::to_string),
        })
    }

    /// Whether this node refers to a named type
    pub fn is_named(&self) -> bool {
        matches!(self, DataType::User(_) | DataType::Media(_))
    }

    /// Name used in error messages
    pub fn name(&self) -> String {
        match self {
            DataType::Primitive(p) => p.name().to_string(),
            DataType::Array(_) => "array".to_string(),
            DataType::Hash(_) => "hash".to_string(),
            DataType::Object(_) => "object".to_string(),
            DataType::User(name) => name.clone(),
            DataType::Media(r) => r.name.clone(),
        }
    }
}

/// An attribute: a type plus the documentation, validation and metadata
/// attached where the type is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub data_type: DataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Required fields of the object this attribute holds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Vec<String>>,
}

impl Attribute {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            description: None,
            required: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Metadata values for `key`, if the key is present at all
    pub fn meta(&self, key: &str) -> Option<&[String]> {
        self.metadata.get(key).map(Vec::as_slice)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r == field)
    }

    /// Union of this attribute's required set with `extra`
    pub fn merge_required(&mut self, extra: &[String]) {
        for name in extra {
            if !self.is_required(name) {
                self.required.push(name.clone());
            }
        }
    }
}

/// Serialized shape of a [`DataType`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
enum TypeSpec {
    /// Primitive, user type or media type name
    Name(String),
    Array {
        array: Box<Attribute>,
    },
    Hash {
        hash: Box<Hash>,
    },
    Object {
        object: Object,
    },
    Media {
        media: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view: Option<String>,
    },
}

impl From<TypeSpec> for DataType {
    fn from(spec: TypeSpec) -> Self {
        match spec {
            // Names that are not primitives are linked to user or media
            // types once the whole design is loaded.
            TypeSpec::Name(name) => match Primitive::from_name(&name) {
                Some(p) => DataType::Primitive(p),
                None => DataType::User(name),
            },
            TypeSpec::Array { array } => DataType::Array(array),
            TypeSpec::Hash { hash } => DataType::Hash(hash),
            TypeSpec::Object { object } => DataType::Object(object),
            TypeSpec::Media { media, view } => DataType::Media(MediaRef { name: media, view }),
        }
    }
}

impl From<DataType> for TypeSpec {
    fn from(t: DataType) -> Self {
        match t {
            DataType::Primitive(p) => TypeSpec::Name(p.name().to_string()),
            DataType::Array(array) => TypeSpec::Array { array },
            DataType::Hash(hash) => TypeSpec::Hash { hash },
            DataType::Object(object) => TypeSpec::Object { object },
            DataType::User(name) => TypeSpec::Name(name),
            DataType::Media(MediaRef { name, view }) => TypeSpec::Media { media: name, view },
        }
    }
}

impl JsonSchema for DataType {
    fn schema_name() -> Cow<'static, str> {
        "DataType".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        TypeSpec::json_schema(generator)
    }
}
