//! Error types for the editor

use fomod_parser::ParseError;
use thiserror::Error;

use crate::mutations::MutationError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Expected a <{expected}> document but found <{found}>")]
    UnexpectedRoot { expected: String, found: String },
}
