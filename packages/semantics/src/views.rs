//! Read-only snapshots of the installer hierarchy.
//!
//! Views are built from a [`Document`] on demand and keep the ids of the
//! nodes they were read from. They do not track later edits; build a new
//! view after mutating the document.

use fomod_editor::{Document, NodeId};
use serde::Serialize;

use crate::conditions::{Conditions, EvalContext};
use crate::enums::{GroupType, OptionType, Order};
use crate::files::Files;
use crate::flags::Flags;
use crate::types::{FilePatterns, TypeDescriptor};

/// The configuration root with its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Root {
    pub name: String,
    pub image: Option<String>,
    pub info: Info,
    /// `moduleDependencies`, gating the whole installer.
    pub conditions: Option<Conditions>,
    pub files: Files,
    pub page_order: Order,
    /// Pages in document order.
    pub pages: Vec<Page>,
    pub file_patterns: FilePatterns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Info {
    pub name: String,
    pub author: String,
    pub version: String,
    pub website: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub node: NodeId,
    pub name: String,
    pub conditions: Option<Conditions>,
    pub group_order: Order,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub node: NodeId,
    pub name: String,
    pub policy: GroupType,
    pub option_order: Order,
    pub options: Vec<Plugin>,
}

/// One selectable option of a group.
#[derive(Debug, Clone, Serialize)]
pub struct Plugin {
    pub node: NodeId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub files: Files,
    pub flags: Flags,
    pub type_descriptor: TypeDescriptor,
}

fn child_text(doc: &Document, id: NodeId, tag: &str) -> String {
    doc.find_child(id, tag)
        .and_then(|child| doc.text(child))
        .unwrap_or_default()
        .to_string()
}

fn name_of(doc: &Document, id: NodeId) -> String {
    doc.attribute(id, "name").unwrap_or_default().to_string()
}

fn order_of(doc: &Document, id: Option<NodeId>) -> Order {
    Order::parse_or_default(id.and_then(|id| doc.attribute(id, "order")))
}

impl Root {
    pub fn from_document(doc: &Document) -> Self {
        let config = doc.config();
        let steps = doc.find_child(config, "installSteps");

        Self {
            name: child_text(doc, config, "moduleName"),
            image: doc
                .find_child(config, "moduleImage")
                .and_then(|image| doc.attribute(image, "path"))
                .filter(|path| !path.is_empty())
                .map(str::to_string),
            info: Info::from_document(doc),
            conditions: doc
                .find_child(config, "moduleDependencies")
                .map(|node| Conditions::from_node(doc, node)),
            files: doc
                .find_child(config, "requiredInstallFiles")
                .map(|node| Files::from_node(doc, node))
                .unwrap_or_default(),
            page_order: order_of(doc, steps),
            pages: steps
                .map(|steps| doc.find_children(steps, "installStep"))
                .unwrap_or_default()
                .into_iter()
                .map(|page| Page::from_node(doc, page))
                .collect(),
            file_patterns: doc
                .find_child(config, "conditionalFileInstalls")
                .map(|node| FilePatterns::from_node(doc, node))
                .unwrap_or_default(),
        }
    }

    /// Pages in installation order.
    pub fn ordered_pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.iter().collect();
        self.page_order.arrange(&mut pages, |page| page.name.as_str());
        pages
    }

    pub fn page(&self, node: NodeId) -> Option<&Page> {
        self.pages.iter().find(|page| page.node == node)
    }

    /// Does nothing ever get installed?
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.pages.is_empty() && self.file_patterns.is_empty()
    }
}

impl Info {
    /// Metadata fields, matched case-insensitively. Absent fields are empty.
    pub fn from_document(doc: &Document) -> Self {
        let field = |tag: &str| info_text(doc, tag).unwrap_or_default();
        Self {
            name: field("Name"),
            author: field("Author"),
            version: field("Version"),
            website: field("Website"),
            description: field("Description"),
        }
    }
}

/// Text of a metadata field. Tag names match case-insensitively.
pub fn info_text(doc: &Document, tag: &str) -> Option<String> {
    let info = doc.info();
    doc.children(info)
        .ok()?
        .iter()
        .find(|child| doc.tag(**child).eq_ignore_ascii_case(tag))
        .map(|child| doc.text(*child).unwrap_or_default().to_string())
}

impl Page {
    /// Read an `installStep` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let groups_node = doc.find_child(id, "optionalFileGroups");
        Self {
            node: id,
            name: name_of(doc, id),
            conditions: doc
                .find_child(id, "visible")
                .map(|node| Conditions::from_node(doc, node)),
            group_order: order_of(doc, groups_node),
            groups: groups_node
                .map(|node| doc.find_children(node, "group"))
                .unwrap_or_default()
                .into_iter()
                .map(|group| Group::from_node(doc, group))
                .collect(),
        }
    }

    /// A page without visibility conditions is always shown.
    pub fn is_visible(&self, ctx: &EvalContext<'_>) -> bool {
        self.conditions
            .as_ref()
            .map_or(true, |conditions| conditions.evaluate(ctx))
    }

    pub fn ordered_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        self.group_order.arrange(&mut groups, |group| group.name.as_str());
        groups
    }

    /// The group owning the option `node`.
    pub fn group_of(&self, node: NodeId) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.options.iter().any(|option| option.node == node))
    }

    pub fn option(&self, node: NodeId) -> Option<&Plugin> {
        self.group_of(node)?.option(node)
    }
}

impl Group {
    /// Read a `group` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let plugins = doc.find_child(id, "plugins");
        Self {
            node: id,
            name: name_of(doc, id),
            policy: GroupType::parse_or_default(doc.attribute(id, "type")),
            option_order: order_of(doc, plugins),
            options: plugins
                .map(|node| doc.find_children(node, "plugin"))
                .unwrap_or_default()
                .into_iter()
                .map(|plugin| Plugin::from_node(doc, plugin))
                .collect(),
        }
    }

    pub fn ordered_options(&self) -> Vec<&Plugin> {
        let mut options: Vec<&Plugin> = self.options.iter().collect();
        self.option_order.arrange(&mut options, |option| option.name.as_str());
        options
    }

    pub fn option(&self, node: NodeId) -> Option<&Plugin> {
        self.options.iter().find(|option| option.node == node)
    }
}

impl Plugin {
    /// Read a `plugin` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        Self {
            node: id,
            name: name_of(doc, id),
            description: child_text(doc, id, "description"),
            image: doc
                .find_child(id, "image")
                .and_then(|image| doc.attribute(image, "path"))
                .map(str::to_string),
            files: doc
                .find_child(id, "files")
                .map(|node| Files::from_node(doc, node))
                .unwrap_or_default(),
            flags: doc
                .find_child(id, "conditionFlags")
                .map(|node| Flags::from_node(doc, node))
                .unwrap_or_default(),
            type_descriptor: doc
                .find_child(id, "typeDescriptor")
                .map(|node| TypeDescriptor::from_node(doc, node))
                .unwrap_or_default(),
        }
    }

    pub fn option_type(&self, ctx: &EvalContext<'_>) -> OptionType {
        self.type_descriptor.resolve(ctx)
    }
}
