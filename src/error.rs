//! Error types for flowgen

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// flowgen errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Design parse error: {0}")]
    DesignParse(String),

    /// The type graph references something that is neither a primitive, a
    /// container, an object, a user type nor a media type.
    #[error("unknown type kind: {name} (referenced from {context})")]
    UnknownTypeKind { name: String, context: String },

    #[error("cannot build an identifier from {0:?}: it contains no letter or digit")]
    InvalidIdentifierInput(String),

    #[error("invalid metadata transform key: missing value on attribute {attribute} of {context}")]
    MalformedMappingKey { attribute: String, context: String },

    #[error("duplicate transform key {key:?} on attributes {first} and {second} of {context}")]
    DuplicateMappingKey {
        key: String,
        first: String,
        second: String,
        context: String,
    },

    #[error("incompatible shapes: {source_name} is {source_kind} but {target_name} is {target_kind}")]
    IncompatibleShape {
        source_name: String,
        source_kind: String,
        target_name: String,
        target_kind: String,
    },

    #[error("incompatible attribute types: {source_ctx} is of type {source_type} but {target_ctx} is of type {target_type}")]
    IncompatibleFieldType {
        source_ctx: String,
        source_type: String,
        target_ctx: String,
        target_type: String,
    },

    #[error("incompatible attribute types: {source_ctx} has elements of type {source_type} but {target_ctx} has elements of type {target_type}")]
    IncompatibleElementType {
        source_ctx: String,
        source_type: String,
        target_ctx: String,
        target_type: String,
    },

    #[error("incompatible attribute types: {source_ctx} is a hash with keys of type {source_type} but {target_ctx} is a hash with keys of type {target_type}")]
    IncompatibleKeyType {
        source_ctx: String,
        source_type: String,
        target_ctx: String,
        target_type: String,
    },

    #[error("transform function {name} is generated for both {first} and {second}")]
    DuplicateFunctionName {
        name: String,
        first: String,
        second: String,
    },

    #[error("type {name} is declared twice: {reason}")]
    DuplicateTypeName { name: String, reason: String },

    #[error("invalid view {view:?} of media type {media}: {reason}")]
    InvalidView {
        media: String,
        view: String,
        reason: String,
    },

    #[error("missing host value, set it in the design or with --host")]
    MissingHost,

    #[error("design requires generator version {requested} but this is {current}")]
    VersionMismatch { requested: String, current: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Model defects mean the type graph was built incorrectly upstream; no
    /// output of the run can be trusted.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::UnknownTypeKind { .. })
    }
}

impl From<minijinja::Error> for Error {
    fn from(e: minijinja::Error) -> Self {
        Error::Template(e.to_string())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_classification() {
        let defect = Error::UnknownTypeKind {
            name: "Ghost".into(),
            context: "types.User.friend".into(),
        };
        assert!(defect.is_defect());
        assert!(!Error::MissingHost.is_defect());
    }

    #[test]
    fn test_structural_error_names_both_sides() {
        let err = Error::IncompatibleFieldType {
            source_ctx: "source.age".into(),
            source_type: "string".into(),
            target_ctx: "target.age".into(),
            target_type: "integer".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("source.age"));
        assert!(msg.contains("target.age"));
        assert!(msg.contains("string"));
        assert!(msg.contains("integer"));
    }
}
