//! Strict schema validity of raw bytes.

use std::sync::Arc;

use fomod_editor::{load_document, EditorError};
use fomod_schema::Schema;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error(transparent)]
    Load(#[from] EditorError),

    #[error("{}", display_invalid(.line, .message))]
    Invalid { line: Option<usize>, message: String },
}

fn display_invalid(line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("line {}: {}", line, message),
        None => message.to_string(),
    }
}

const COMMENTS_PRESENT: &str = "XML Comments Present";

/// Fail with the first schema violation in `bytes`, a metadata or
/// configuration document.
pub fn assert_valid_bytes(schema: Arc<Schema>, bytes: &[u8]) -> Result<(), LintError> {
    let (_, _, warnings) = load_document(schema, bytes)?;
    match warnings
        .into_iter()
        .find(|w| w.is_critical() && w.title != COMMENTS_PRESENT)
    {
        Some(violation) => Err(LintError::Invalid {
            line: violation.line,
            message: format!("{}: {}", violation.title, violation.message),
        }),
        None => Ok(()),
    }
}

/// Is `bytes` a schema-valid document?
pub fn validate_bytes(schema: Arc<Schema>, bytes: &[u8]) -> bool {
    assert_valid_bytes(schema, bytes).is_ok()
}
