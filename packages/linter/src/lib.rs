//! Semantic checks over installer documents.
//!
//! Two passes live here:
//!
//! - [`validate`] walks a loaded [`Document`](fomod_editor::Document) and
//!   runs every [`Check`] registered for each node's [`Category`]. Checks
//!   are pluggable through [`CheckRegistry`].
//! - [`check_for_errors`] takes a raw document, requires it to be
//!   schema-valid and reports package-level problems such as missing
//!   sources and images.

mod checks;
mod context;
mod error_checks;
mod linter;
mod strict;

pub use checks::{Category, Check, CheckRegistry, FnCheck};
pub use context::CheckContext;
pub use error_checks::{
    check_for_errors, check_for_errors_in, default_checkers, ErrorChecker, FomodError,
};
pub use fomod_editor::{Severity, ValidationWarning};
pub use linter::{validate, validate_document};
pub use strict::{assert_valid_bytes, validate_bytes, LintError};
