//! Read-only pages handed to the caller while navigating.

use fomod_editor::NodeId;
use fomod_semantics::{EvalContext, GroupType, OptionType, Page};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub node: NodeId,
    pub name: String,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub node: NodeId,
    pub name: String,
    pub policy: GroupType,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub node: NodeId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    /// Resolved against the flags set before this page.
    pub option_type: OptionType,
}

impl PageView {
    /// Groups and options in their configured order.
    pub(crate) fn new(page: &Page, ctx: &EvalContext<'_>) -> Self {
        let groups = page
            .ordered_groups()
            .into_iter()
            .map(|group| GroupView {
                node: group.node,
                name: group.name.clone(),
                policy: group.policy,
                options: group
                    .ordered_options()
                    .into_iter()
                    .map(|option| OptionView {
                        node: option.node,
                        name: option.name.clone(),
                        description: option.description.clone(),
                        image: option.image.clone(),
                        option_type: option.option_type(ctx),
                    })
                    .collect(),
            })
            .collect();
        Self {
            node: page.node,
            name: page.name.clone(),
            groups,
        }
    }

    pub fn group(&self, name: &str) -> Option<&GroupView> {
        self.groups.iter().find(|group| group.name == name)
    }
}

impl GroupView {
    pub fn option(&self, name: &str) -> Option<&OptionView> {
        self.options.iter().find(|option| option.name == name)
    }
}
