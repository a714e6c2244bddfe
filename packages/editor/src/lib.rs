//! # FOMOD Editor
//!
//! Schema-constrained editing of installer documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: bytes → raw XML tree                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document arena + schema rules       │
//! │  - Correcting load / save                   │
//! │  - Validated structural mutations           │
//! │  - Typed attribute access                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ semantics / linter / installer: read views  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Always valid**: every attached node's children satisfy the schema
//!    after each successful mutation
//! 2. **All or nothing**: mutations validate before they touch the tree
//! 3. **Forgiving input**: loading never fails on schema violations, it
//!    corrects them and reports critical warnings
//! 4. **Arena ownership**: parents own children, parent links are plain ids
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fomod_editor::{load, save, Document};
//! use fomod_schema::Schema;
//!
//! let schema = Arc::new(Schema::fomod());
//! let (mut doc, warnings) = load(schema, Some(&info), &config)?;
//!
//! let steps = doc.add_child(doc.config(), "installSteps")?;
//! doc.set_attribute(steps, "order", "Explicit")?;
//!
//! let (info, config) = save(&doc)?;
//! ```

mod attributes;
mod document;
mod errors;
mod loader;
mod mutations;
mod node;
mod warnings;
mod writer;

pub use attributes::AttributeValue;
pub use document::Document;
pub use errors::EditorError;
pub use loader::{load, load_document};
pub use mutations::{Mutation, MutationError};
pub use node::NodeId;
pub use warnings::{Severity, ValidationWarning};
pub use writer::{save, to_xml, SCHEMA_LOCATION, XSI_NAMESPACE};

use std::sync::Arc;

use fomod_schema::Schema;

/// An empty, valid installer.
pub fn new_document(schema: Arc<Schema>) -> Result<Document, MutationError> {
    Document::new(schema)
}
