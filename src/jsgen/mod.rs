//! Type mapping and transform engine
//!
//! Everything that turns the type graph of a [`Design`] into Flow source
//! text lives here:
//!
//! - [`jsify`] normalizes arbitrary strings into identifiers
//! - [`TypeMapper::type_name`] and [`TypeMapper::type_def`] render type
//!   references and structural definitions
//! - [`TypeMapper::describe`] synthesizes a comment for named types
//! - [`compute_mapping`] joins the fields of two objects
//! - [`TransformGenerator`] emits conversion functions between types
//!
//! Named types are always rendered by name, never expanded in place, which
//! is what keeps rendering of cyclic type graphs finite.

mod describe;
mod mapping;
mod naming;
mod transform;
mod typedef;
mod typename;

pub use mapping::compute_mapping;
pub use naming::{jsify, jsify_att, TempVars};
pub use transform::TransformGenerator;
pub use typename::native_type;

use crate::design::Design;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rendering options shared by every generated declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RenderConfig {
    /// Indentation unit
    pub indent: String,
    /// Render fields missing from the required set as `name?: T`
    pub optional_fields: bool,
    /// Prepend a provenance header to generated files
    pub provenance: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            optional_fields: false,
            provenance: false,
        }
    }
}

/// Renders type nodes of one design as Flow source text
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    design: &'a Design,
    config: &'a RenderConfig,
}

impl<'a> TypeMapper<'a> {
    pub fn new(design: &'a Design, config: &'a RenderConfig) -> Self {
        Self { design, config }
    }

    pub fn design(&self) -> &'a Design {
        self.design
    }

    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    fn indent(&self, depth: usize) -> String {
        self.config.indent.repeat(depth)
    }
}
