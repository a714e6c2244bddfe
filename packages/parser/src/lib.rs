//! Raw XML reading and writing for installer documents.
//!
//! This crate knows nothing about the FOMOD schema. It turns bytes into an
//! [`XmlElement`] tree (with source lines and captured comments) and back.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;

pub use ast::{XmlDocument, XmlElement};
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_str, Parser};
pub use serializer::{serialize, Serializer};
