use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown tag '{tag}' under '{parent}'")]
    UnknownTag { parent: String, tag: String },

    #[error("Unknown schema type '{0}'")]
    UnknownType(String),

    #[error("Unknown attribute '{name}' for '{type_name}'")]
    UnknownAttribute { type_name: String, name: String },

    #[error("Invalid compiled schema: {0}")]
    Json(String),
}

impl SchemaError {
    pub fn unknown_tag(parent: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownTag {
            parent: parent.into(),
            tag: tag.into(),
        }
    }

    pub fn unknown_attribute(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Json(e.to_string())
    }
}
