use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::node::NodeId;

/// How serious a warning is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The document likely fails external consumers or loses information on write
    Critical,
    /// Valid, but semantically suspect
    Warning,
}

/// A problem found while loading or validating a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub title: String,
    pub message: String,
    pub severity: Severity,

    /// The offending node, when there is one
    pub node: Option<NodeId>,

    /// Tag of the offending node
    pub tag: Option<String>,

    /// Source line of the offending node, if it came from parsed input
    pub line: Option<usize>,
}

impl ValidationWarning {
    pub fn critical(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Critical,
            node: None,
            tag: None,
            line: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::critical(title, message)
        }
    }

    /// Point the warning at `node`, copying its tag and source line.
    pub fn at(mut self, doc: &Document, node: NodeId) -> Self {
        self.node = Some(node);
        self.tag = Some(doc.tag(node).to_string());
        self.line = doc.line(node);
        self
    }

    /// Locate a warning about an element that never became a node.
    pub fn with_location(mut self, tag: impl Into<String>, line: usize) -> Self {
        self.tag = Some(tag.into());
        self.line = if line > 0 { Some(line) } else { None };
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {}): {}", self.title, line, self.message),
            None => write!(f, "{}: {}", self.title, self.message),
        }
    }
}
