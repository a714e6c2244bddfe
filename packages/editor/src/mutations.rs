//! # Mutations
//!
//! Schema-aware structural edits on a [`Document`].
//!
//! Every mutation is validated in full before anything is touched, so a
//! failed mutation leaves the document exactly as it was. A successful
//! mutation leaves every attached node's children accepted by its content
//! model.
//!
//! ## Semantics
//!
//! ### AddChild
//! - The new node goes where the content model puts it; a repeatable tag
//!   lands after its last same-tag sibling
//! - Mandatory descendants and required attributes are synthesized
//!
//! ### RemoveChild
//! - Fails if the remaining children would no longer be accepted
//! - The removed node becomes an orphan
//!
//! ### ReplaceChild
//! - The new node must carry the declared type of its tag under the parent
//! - The new node is detached from wherever it was; the old one becomes an orphan
//!
//! ### ReorderChild
//! - Moves a node among its same-tag siblings only

use fomod_schema::{ElementDef, SchemaError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::attributes::AttributeValue;
use crate::document::Document;
use crate::node::NodeId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Add a new `tag` child, with its mandatory descendants
    AddChild { parent: NodeId, tag: String },

    RemoveChild { parent: NodeId, child: NodeId },

    ReplaceChild {
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    },

    /// Move `child` by `offset` places among its same-tag siblings
    ReorderChild {
        parent: NodeId,
        child: NodeId,
        offset: isize,
    },

    /// Set an attribute, or with `None` remove it
    SetAttribute {
        node: NodeId,
        name: String,
        value: Option<AttributeValue>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Unknown tag '{tag}' under '{parent}'")]
    UnknownTag { parent: String, tag: String },

    #[error("Unknown attribute '{name}' on '{tag}'")]
    UnknownAttribute { tag: String, name: String },

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Cannot convert '{value}' to {expected} for attribute '{name}'")]
    TypeCoercion {
        name: String,
        value: String,
        expected: String,
    },

    #[error("Value '{value}' is not allowed for attribute '{name}', expected one of: {allowed}")]
    Restriction {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("Node {0} is detached from the tree")]
    Orphan(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

impl From<SchemaError> for MutationError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::UnknownTag { parent, tag } => MutationError::UnknownTag { parent, tag },
            SchemaError::UnknownAttribute { type_name, name } => MutationError::UnknownAttribute {
                tag: type_name,
                name,
            },
            other => MutationError::SchemaViolation(other.to_string()),
        }
    }
}

impl Mutation {
    /// Apply the mutation with validation.
    ///
    /// Returns the created node for [`Mutation::AddChild`].
    pub fn apply(&self, doc: &mut Document) -> Result<Option<NodeId>, MutationError> {
        // Validate first
        self.validate(doc)?;

        match self {
            Mutation::AddChild { parent, tag } => Self::apply_add(doc, *parent, tag).map(Some),

            Mutation::RemoveChild { parent, child } => {
                Self::apply_remove(doc, *parent, *child);
                Ok(None)
            }

            Mutation::ReplaceChild { parent, old, new } => {
                Self::apply_replace(doc, *parent, *old, *new);
                Ok(None)
            }

            Mutation::ReorderChild {
                parent,
                child,
                offset,
            } => {
                Self::apply_reorder(doc, *parent, *child, *offset);
                Ok(None)
            }

            Mutation::SetAttribute { node, name, value } => {
                let raw = doc.validate_attribute(*node, name, value.as_ref())?;
                let attributes = &mut doc.node_mut(*node).attributes;
                match raw {
                    Some(raw) => attributes.insert(name.clone(), raw),
                    None => attributes.remove(name),
                };
                Ok(None)
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::AddChild { parent, tag } => {
                doc.ensure_structural(*parent)?;
                doc.insertion_point(*parent, tag).map(|_| ())
            }

            Mutation::RemoveChild { parent, child } => {
                doc.ensure_structural(*parent)?;
                doc.ensure_child(*parent, *child)?;
                doc.ensure_removable(*parent, *child)
            }

            Mutation::ReplaceChild { parent, old, new } => {
                doc.ensure_structural(*parent)?;
                doc.ensure_child(*parent, *old)?;
                if !doc.contains(*new) {
                    return Err(MutationError::NodeNotFound(*new));
                }
                if new == old {
                    return Ok(());
                }
                if doc.is_root(*new) || doc.is_ancestor_or_self(*new, *parent) {
                    return Err(MutationError::SchemaViolation(format!(
                        "{} cannot be moved inside itself",
                        new
                    )));
                }

                let parent_tag = doc.tag(*parent);
                let new_tag = doc.tag(*new);
                let declared = doc
                    .schema
                    .valid_children(doc.kind(*parent))?
                    .element(new_tag)
                    .ok_or_else(|| {
                        MutationError::SchemaViolation(format!(
                            "'{}' is not allowed inside '{}'",
                            new_tag, parent_tag
                        ))
                    })?;
                if declared.type_name != doc.kind(*new) {
                    return Err(MutationError::SchemaViolation(format!(
                        "'{}' under '{}' must be a '{}', not a '{}'",
                        new_tag,
                        parent_tag,
                        declared.type_name,
                        doc.kind(*new)
                    )));
                }

                let tags: Vec<&str> = doc
                    .node(*parent)
                    .children
                    .iter()
                    .filter(|c| **c != *new)
                    .map(|c| if c == old { new_tag } else { doc.tag(*c) })
                    .collect();
                if !doc.schema.valid_children(doc.kind(*parent))?.accepts(&tags) {
                    return Err(MutationError::SchemaViolation(format!(
                        "'{}' cannot take the place of '{}' inside '{}'",
                        new_tag,
                        doc.tag(*old),
                        parent_tag
                    )));
                }

                // Taking `new` from another parent must not break that parent.
                match doc.parent(*new) {
                    Some(previous) if previous != *parent => doc.ensure_removable(previous, *new),
                    _ => Ok(()),
                }
            }

            Mutation::ReorderChild {
                parent,
                child,
                offset,
            } => {
                doc.ensure_structural(*parent)?;
                doc.ensure_child(*parent, *child)?;
                let siblings = doc.find_children(*parent, doc.tag(*child));
                if siblings.len() < 2 {
                    return Err(MutationError::SchemaViolation(format!(
                        "'{}' has no same-tag siblings to be reordered among",
                        doc.tag(*child)
                    )));
                }
                let position = siblings.iter().position(|s| s == child).unwrap_or(0) as isize;
                let target = position + offset;
                if target < 0 || target >= siblings.len() as isize {
                    return Err(MutationError::SchemaViolation(format!(
                        "offset {} moves '{}' out of range",
                        offset,
                        doc.tag(*child)
                    )));
                }
                Ok(())
            }

            Mutation::SetAttribute { node, name, value } => {
                doc.validate_attribute(*node, name, value.as_ref()).map(|_| ())
            }
        }
    }

    fn apply_add(doc: &mut Document, parent: NodeId, tag: &str) -> Result<NodeId, MutationError> {
        let (index, def) = doc.insertion_point(parent, tag)?;
        let id = doc.create(tag, def.type_name);
        doc.attach(parent, id, index);
        doc.complete(id)?;
        debug!(parent = %parent, tag, index, node = %id, "added child");
        Ok(id)
    }

    fn apply_remove(doc: &mut Document, parent: NodeId, child: NodeId) {
        doc.detach(child);
        debug!(parent = %parent, node = %child, "removed child");
    }

    fn apply_replace(doc: &mut Document, parent: NodeId, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        doc.detach(new);
        if let Some(index) = doc.node(parent).children.iter().position(|c| *c == old) {
            doc.node_mut(parent).children[index] = new;
            doc.node_mut(new).parent = Some(parent);
            doc.node_mut(old).parent = None;
        }
        debug!(parent = %parent, old = %old, new = %new, "replaced child");
    }

    fn apply_reorder(doc: &mut Document, parent: NodeId, child: NodeId, offset: isize) {
        let current = doc.node(parent).children.clone();
        let slots: Vec<usize> = current
            .iter()
            .enumerate()
            .filter(|(_, c)| doc.tag(**c) == doc.tag(child))
            .map(|(i, _)| i)
            .collect();

        let mut order: Vec<NodeId> = slots.iter().map(|i| current[*i]).collect();
        let position = order.iter().position(|c| *c == child).unwrap_or(0);
        let target = (position as isize + offset) as usize;
        let moved = order.remove(position);
        order.insert(target, moved);

        let children = &mut doc.node_mut(parent).children;
        for (slot, id) in slots.into_iter().zip(order) {
            children[slot] = id;
        }
        debug!(parent = %parent, node = %child, offset, "reordered child");
    }
}

impl Document {
    pub fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, MutationError> {
        mutation.apply(self)
    }

    pub fn can_add_child(&self, parent: NodeId, tag: &str) -> bool {
        Mutation::AddChild {
            parent,
            tag: tag.to_string(),
        }
        .validate(self)
        .is_ok()
    }

    /// Add a `tag` child where the content model puts it, synthesizing its
    /// mandatory descendants.
    pub fn add_child(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, MutationError> {
        Mutation::AddChild {
            parent,
            tag: tag.to_string(),
        }
        .validate(self)?;
        Mutation::apply_add(self, parent, tag)
    }

    pub fn can_remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        Mutation::RemoveChild { parent, child }.validate(self).is_ok()
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), MutationError> {
        Mutation::RemoveChild { parent, child }.apply(self).map(|_| ())
    }

    pub fn can_replace_child(&self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        Mutation::ReplaceChild { parent, old, new }.validate(self).is_ok()
    }

    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), MutationError> {
        Mutation::ReplaceChild { parent, old, new }.apply(self).map(|_| ())
    }

    pub fn reorder_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        offset: isize,
    ) -> Result<(), MutationError> {
        Mutation::ReorderChild {
            parent,
            child,
            offset,
        }
        .apply(self)
        .map(|_| ())
    }

    pub(crate) fn ensure_child(&self, parent: NodeId, child: NodeId) -> Result<(), MutationError> {
        if !self.contains(child) {
            return Err(MutationError::NodeNotFound(child));
        }
        if self.parent(child) != Some(parent) {
            return Err(MutationError::NotAChild { parent, child });
        }
        Ok(())
    }

    fn ensure_removable(&self, parent: NodeId, child: NodeId) -> Result<(), MutationError> {
        let tags: Vec<&str> = self
            .node(parent)
            .children
            .iter()
            .filter(|c| **c != child)
            .map(|c| self.tag(*c))
            .collect();
        if self.schema.valid_children(self.kind(parent))?.accepts(&tags) {
            Ok(())
        } else {
            Err(MutationError::SchemaViolation(format!(
                "'{}' cannot be removed from '{}'",
                self.tag(child),
                self.tag(parent)
            )))
        }
    }

    /// Where a new `tag` child would go, and its declaration.
    pub(crate) fn insertion_point(
        &self,
        parent: NodeId,
        tag: &str,
    ) -> Result<(usize, ElementDef), MutationError> {
        let content = self.schema.valid_children(self.kind(parent))?;
        let def = content.element(tag).ok_or_else(|| MutationError::UnknownTag {
            parent: self.tag(parent).to_string(),
            tag: tag.to_string(),
        })?;
        let index = content
            .insertion_index(&self.child_tags(parent), tag)
            .ok_or_else(|| {
                MutationError::SchemaViolation(format!(
                    "'{}' cannot be added to '{}'",
                    tag,
                    self.tag(parent)
                ))
            })?;
        Ok((index, def.clone()))
    }

    /// Fill required attributes and add missing mandatory children,
    /// recursively. Returns the added children.
    pub(crate) fn complete(&mut self, id: NodeId) -> Result<Vec<NodeId>, MutationError> {
        self.fill_required_attributes(id)?;
        self.complete_children(id)
    }

    /// Store the fallback value for every missing required attribute.
    pub(crate) fn fill_required_attributes(
        &mut self,
        id: NodeId,
    ) -> Result<Vec<(String, String)>, MutationError> {
        let node = self.node(id);
        let missing: Vec<(String, String)> = self
            .schema
            .valid_attributes(&node.kind)?
            .iter()
            .filter(|def| def.required && !node.attributes.contains_key(&def.name))
            .map(|def| (def.name.clone(), def.fallback_value()))
            .collect();

        for (name, value) in &missing {
            self.node_mut(id).attributes.insert(name.clone(), value.clone());
        }
        Ok(missing)
    }

    pub(crate) fn complete_children(&mut self, id: NodeId) -> Result<Vec<NodeId>, MutationError> {
        let schema = self.shared_schema();
        let content = schema.valid_children(self.kind(id))?;
        if content.accepts(&self.child_tags(id)) {
            return Ok(Vec::new());
        }

        let mut added = Vec::new();
        for (tag, min) in content.required_children() {
            let present = self.find_children(id, &tag).len();
            for _ in present..min as usize {
                let (index, def) = self.insertion_point(id, &tag)?;
                let child = self.create(tag.clone(), def.type_name);
                self.attach(id, child, index);
                self.complete(child)?;
                added.push(child);
            }
        }
        Ok(added)
    }
}
