use fomod_editor::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallerError {
    #[error("The installer's module dependencies are not met")]
    FailedCondition,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A page or option the installer recorded was removed from the
    /// document.
    #[error("{0} is no longer part of the installer")]
    StaleNode(NodeId),
}

pub type InstallerResult<T> = Result<T, InstallerError>;
