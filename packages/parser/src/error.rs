use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("XML syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unsupported text encoding: {0}")]
    Encoding(String),

    #[error("Document has no root element")]
    NoRoot,

    #[error("Element '{tag}' opened at line {line} is never closed")]
    UnclosedElement { tag: String, line: usize },

    #[error("Failed to write XML: {0}")]
    Write(String),
}

impl ParseError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    pub fn unclosed(tag: impl Into<String>, line: usize) -> Self {
        Self::UnclosedElement {
            tag: tag.into(),
            line,
        }
    }

    /// Line the error refers to, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } | ParseError::UnclosedElement { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Write(e.to_string())
    }
}
