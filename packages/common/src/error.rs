use std::path::PathBuf;

use thiserror::Error;

/// Errors shared by every crate that touches a package on disk
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No installer folder found under {0}")]
    NotAPackage(PathBuf),

    #[error("Installer folder {0} has no ModuleConfig.xml")]
    MissingConfig(PathBuf),

    #[error("{0}")]
    Generic(String),
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}
