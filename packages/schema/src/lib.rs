//! # FOMOD Schema Model
//!
//! Compiled structural rules of the installer documents: which children an
//! element may have and in what order, attribute declarations with their
//! types, defaults and restrictions, and element text types.
//!
//! The model is a pure lookup table. A schema is built once (usually via
//! [`Schema::fomod`] or [`Schema::from_json`]) and shared read-only, typically
//! behind an `Arc`.

mod content;
pub mod error;
mod fomod;
mod model;

pub use error::{SchemaError, SchemaResult};
pub use fomod::{CONFIG_ROOT, INFO_ROOT};
pub use model::{
    AttributeDef, ComplexType, Compositor, ElementDef, Enumeration, MaxOccurs, OrderIndicator,
    Particle, Schema, ValueType,
};
