// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # flowgen — Flow client generation from API designs
//!
//! Design-driven generation of a typed JavaScript (Flow) client module.
//!
//! ## Core Concept
//!
//! An API **design** describes resources, their actions and routes, and the
//! types exchanged: user types, and media types rendered through views.
//! From a single design, flowgen produces `js/client.js` holding:
//!
//! - a `Client` class with one request method per action
//! - one `export type` declaration per media type view and user type
//! - transform functions converting values between compatible types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowgen::{Design, GeneratorConfig, RenderConfig, TransformGenerator, DataType};
//!
//! let design = Design::from_yaml(r#"
//!   name: skydive
//!   host: localhost:9099
//!   types:
//!     AircraftForm:
//!       type: { object: { name: { type: string } } }
//!     AircraftPatch:
//!       type: { object: { name: { type: string } } }
//! "#)?;
//!
//! // Whole client module
//! let code = flowgen::render_client(&design, &GeneratorConfig::default(), None)?;
//!
//! // A single transform function
//! let config = RenderConfig::default();
//! let mut transforms = TransformGenerator::new(&design, &config);
//! let js = transforms.transform(
//!     &DataType::user("AircraftForm"),
//!     &DataType::user("AircraftPatch"),
//!     None,
//! )?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  DESIGN (YAML)                                              │
//! │       │                                                     │
//! │       ├──► Design::from_yaml ──► linked type graph          │
//! │       │                                                     │
//! │  JSGEN                                                      │
//! │       │                                                     │
//! │       ├──► jsify(name) ──► identifier                       │
//! │       ├──► type_name / type_def / describe ──► declarations │
//! │       ├──► compute_mapping(source, target) ──► field join   │
//! │       └──► TransformGenerator ──► conversion functions      │
//! │                                                             │
//! │  GENERATOR                                                  │
//! │       │                                                     │
//! │       └──► templates ──► js/client.js                       │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod design;
pub mod error;
pub mod generator;
pub mod jsgen;
pub mod templates;
pub mod util;

// Re-exports
pub use config::{check_version, GeneratorConfig, Overrides};
pub use design::{
    Attribute, DataType, Design, Kind, MediaType, Primitive, Projection, Resource,
    TransformRequest, UserType,
};
pub use error::{Error, Result};
pub use generator::{render_client, ClientSettings, Generator};
pub use jsgen::{
    compute_mapping, jsify, jsify_att, RenderConfig, TempVars, TransformGenerator, TypeMapper,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
