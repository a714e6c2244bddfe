use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node in a [`Document`](crate::Document) arena.
///
/// Handles stay valid for the lifetime of the document that created them.
/// Removed nodes keep their handle and become orphans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub tag: String,
    /// Schema type name the node was declared with
    pub kind: String,
    /// Raw attribute values; absent means "use the declared default"
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    /// Back-reference only, ownership runs parent to child
    pub parent: Option<NodeId>,
    pub comment: Option<String>,
    pub line: Option<usize>,
}

impl NodeData {
    pub fn new(tag: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            kind: kind.into(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            comment: None,
            line: None,
        }
    }
}
