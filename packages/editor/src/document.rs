//! # Document
//!
//! The in-memory form of an installer: one arena holding both the
//! configuration tree (`config`) and the metadata tree (`fomod`).
//!
//! Nodes are addressed by [`NodeId`]. A node without a parent that is not
//! one of the two roots is an *orphan*: its tag, attributes and text stay
//! readable, but child-structural operations fail with
//! [`MutationError::Orphan`] until it is attached again or promoted to a
//! root.

use std::sync::Arc;

use fomod_schema::{Schema, CONFIG_ROOT, INFO_ROOT};

use crate::mutations::MutationError;
use crate::node::{NodeData, NodeId};

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) schema: Arc<Schema>,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) config: NodeId,
    pub(crate) info: NodeId,
}

impl Document {
    /// An empty, valid document: both roots plus their mandatory descendants.
    pub fn new(schema: Arc<Schema>) -> Result<Self, MutationError> {
        let mut doc = Self::with_roots(schema)?;
        doc.complete(doc.config)?;
        doc.complete(doc.info)?;
        Ok(doc)
    }

    /// Both roots with nothing inside them.
    pub(crate) fn with_roots(schema: Arc<Schema>) -> Result<Self, MutationError> {
        let config_type = schema.root(CONFIG_ROOT)?.type_name.clone();
        let info_type = schema.root(INFO_ROOT)?.type_name.clone();
        let mut doc = Self {
            schema,
            nodes: Vec::new(),
            config: NodeId(0),
            info: NodeId(0),
        };
        doc.config = doc.create(CONFIG_ROOT, config_type);
        doc.info = doc.create(INFO_ROOT, info_type);
        Ok(doc)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Root of the configuration tree.
    pub fn config(&self) -> NodeId {
        self.config
    }

    /// Root of the metadata tree.
    pub fn info(&self) -> NodeId {
        self.info
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.config || id == self.info
    }

    /// Was `id` created by this document?
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub(crate) fn create(&mut self, tag: impl Into<String>, kind: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(tag, kind));
        id
    }

    /// # Panics
    ///
    /// The accessors below panic if `id` was not created by this document.
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Schema type name of the node's declaration.
    pub fn kind(&self, id: NodeId) -> &str {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// 1-based line in the source the node was parsed from.
    pub fn line(&self, id: NodeId) -> Option<usize> {
        self.node(id).line
    }

    pub fn is_orphan(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none() && !self.is_root(id)
    }

    /// Is `id` reachable from one of the two roots?
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_root(self.root_of(id))
    }

    /// Topmost ancestor of `id` (itself when it has no parent).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Is `ancestor` equal to `id` or one of its ancestors?
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    pub(crate) fn ensure_structural(&self, id: NodeId) -> Result<(), MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id));
        }
        if self.is_orphan(id) {
            return Err(MutationError::Orphan(id));
        }
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], MutationError> {
        self.ensure_structural(id)?;
        Ok(&self.node(id).children)
    }

    pub(crate) fn child_tags(&self, id: NodeId) -> Vec<&str> {
        self.node(id)
            .children
            .iter()
            .map(|child| self.tag(*child))
            .collect()
    }

    /// First child with `tag`. Orphans report no children.
    pub fn find_child(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.children(id)
            .ok()?
            .iter()
            .copied()
            .find(|child| self.tag(*child) == tag)
    }

    /// Every child with `tag`, in document order. Orphans report no children.
    pub fn find_children(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(id)
            .map(|children| {
                children
                    .iter()
                    .copied()
                    .filter(|child| self.tag(*child) == tag)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `id` and all its descendants, pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Ok(children) = self.children(current) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Set the character data of a text-typed element. An empty string
    /// clears it.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id));
        }
        if self.schema.element_type(self.kind(id))?.is_none() {
            return Err(MutationError::SchemaViolation(format!(
                "'{}' does not hold text",
                self.tag(id)
            )));
        }
        let text = text.into();
        self.node_mut(id).text = if text.is_empty() { None } else { Some(text) };
        Ok(())
    }

    pub fn comment(&self, id: NodeId) -> Option<&str> {
        self.node(id).comment.as_deref()
    }

    /// Attach a comment written immediately before the node. An empty
    /// string removes it.
    ///
    /// # Panics
    ///
    /// If `id` was not created by this document.
    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) {
        let comment = comment.into();
        self.node_mut(id).comment = if comment.is_empty() { None } else { Some(comment) };
    }

    /// Deep copy of `id`. The copy is an orphan.
    pub fn copy(&mut self, id: NodeId) -> NodeId {
        let mut data = self.node(id).clone();
        let children = std::mem::take(&mut data.children);
        data.parent = None;

        let copy = NodeId(self.nodes.len());
        self.nodes.push(data);
        for child in children {
            let child_copy = self.copy(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Make an orphan the new configuration or metadata root, chosen by its
    /// tag. The replaced root becomes an orphan.
    pub fn promote(&mut self, id: NodeId) -> Result<(), MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id));
        }
        if !self.is_orphan(id) {
            return Err(MutationError::SchemaViolation(format!(
                "{} is attached and cannot become a root",
                id
            )));
        }

        let tag = self.tag(id).to_string();
        let declared = self.schema.root(&tag)?;
        if declared.type_name != self.kind(id) {
            return Err(MutationError::SchemaViolation(format!(
                "'{}' was declared as '{}', a root must be '{}'",
                tag,
                self.kind(id),
                declared.type_name
            )));
        }
        let tags = self.child_tags(id);
        if !self.schema.valid_children(self.kind(id))?.accepts(&tags) {
            return Err(MutationError::SchemaViolation(format!(
                "the children of '{}' do not form a valid document",
                tag
            )));
        }

        if tag == CONFIG_ROOT {
            self.config = id;
        } else {
            self.info = id;
        }
        Ok(())
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new(Arc::new(Schema::fomod())).unwrap()
    }

    #[test]
    fn test_new_document_has_mandatory_children() {
        let doc = document();
        assert_eq!(doc.tag(doc.config()), "config");
        assert_eq!(doc.tag(doc.info()), "fomod");

        let children = doc.children(doc.config()).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.tag(children[0]), "moduleName");
        assert!(doc.children(doc.info()).unwrap().is_empty());
    }

    #[test]
    fn test_copy_is_an_orphan() {
        let mut doc = document();
        let name = doc.find_child(doc.config(), "moduleName").unwrap();
        doc.set_text(name, "My Mod").unwrap();

        let copy = doc.copy(name);
        assert!(doc.is_orphan(copy));
        assert_eq!(doc.text(copy), Some("My Mod"));
        assert_eq!(doc.children(copy), Err(MutationError::Orphan(copy)));
        assert!(!doc.is_orphan(name));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let mut doc = document();
        let config = doc.config();
        let steps = doc.add_child(config, "installSteps").unwrap();
        let tags: Vec<&str> = doc.descendants(steps).iter().map(|id| doc.tag(*id)).collect();
        assert_eq!(
            tags,
            vec![
                "installSteps",
                "installStep",
                "optionalFileGroups",
                "group",
                "plugins",
                "plugin",
                "description",
                "typeDescriptor",
                "type",
            ]
        );
    }

    #[test]
    fn test_set_text_requires_text_type() {
        let mut doc = document();
        let config = doc.config();
        assert!(matches!(
            doc.set_text(config, "nope"),
            Err(MutationError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_promote_copy_of_root() {
        let mut doc = document();
        let old = doc.config();
        let copy = doc.copy(old);

        doc.promote(copy).unwrap();
        assert_eq!(doc.config(), copy);
        assert!(doc.is_orphan(old));
        assert!(doc.children(copy).is_ok());
    }

    #[test]
    fn test_promote_rejects_non_root_tags() {
        let mut doc = document();
        let name = doc.find_child(doc.config(), "moduleName").unwrap();
        let copy = doc.copy(name);
        assert!(matches!(doc.promote(copy), Err(MutationError::UnknownTag { .. })));
        assert!(matches!(doc.promote(name), Err(MutationError::SchemaViolation(_))));
    }

    #[test]
    #[should_panic]
    fn test_set_comment_on_foreign_node_panics() {
        let mut small = document();
        let mut big = document();
        let config = big.config();
        let steps = big.add_child(config, "installSteps").unwrap();
        assert!(!small.contains(steps));
        small.set_comment(steps, "not mine");
    }

    #[test]
    fn test_comment_empty_means_none() {
        let mut doc = document();
        let config = doc.config();
        doc.set_comment(config, "generated");
        assert_eq!(doc.comment(config), Some("generated"));
        doc.set_comment(config, "");
        assert_eq!(doc.comment(config), None);
    }
}
