use fomod_editor::{NodeId, ValidationWarning};
use fomod_semantics::{Group, GroupType, OptionType, Order};

use super::{Category, CheckRegistry, FnCheck};
use crate::context::CheckContext;

pub(super) fn register(registry: &mut CheckRegistry) {
    registry.add(FnCheck::new("order", Category::Pages, |ctx, id| {
        order_warning(ctx, Some(id))
    }));

    registry.add(FnCheck::new("empty-page", Category::Page, |ctx, id| {
        let groups = ctx.doc.find_child(id, "optionalFileGroups");
        let empty = groups.map_or(true, |g| ctx.doc.find_children(g, "group").is_empty());
        when(empty, || ValidationWarning::warning("Empty Page", "This page is empty."))
    }));
    registry.add(FnCheck::new("page-name", Category::Page, |ctx, id| {
        when(unnamed(ctx, id), || {
            ValidationWarning::warning("Empty Page Name", "This page has no name.")
        })
    }));
    registry.add(FnCheck::new("order", Category::Page, |ctx, id| {
        order_warning(ctx, ctx.doc.find_child(id, "optionalFileGroups"))
    }));

    registry.add(FnCheck::new("empty-group", Category::Group, |ctx, id| {
        let plugins = ctx.doc.find_child(id, "plugins");
        let empty = plugins.map_or(true, |p| ctx.doc.find_children(p, "plugin").is_empty());
        when(empty, || ValidationWarning::warning("Empty Group", "This group is empty."))
    }));
    registry.add(FnCheck::new("group-name", Category::Group, |ctx, id| {
        when(unnamed(ctx, id), || {
            ValidationWarning::warning("Empty Group Name", "This group has no name.")
        })
    }));
    registry.add(FnCheck::new("order", Category::Group, |ctx, id| {
        order_warning(ctx, ctx.doc.find_child(id, "plugins"))
    }));
    registry.add(FnCheck::new("group-policy", Category::Group, group_policy));
}

pub(super) fn when(
    condition: bool,
    warning: impl FnOnce() -> ValidationWarning,
) -> Vec<ValidationWarning> {
    if condition {
        vec![warning()]
    } else {
        Vec::new()
    }
}

pub(super) fn unnamed(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    ctx.doc.attribute(id, "name").unwrap_or_default().is_empty()
}

/// The `order` attribute of `holder` sorts its children unless Explicit.
fn order_warning(ctx: &CheckContext<'_>, holder: Option<NodeId>) -> Vec<ValidationWarning> {
    let order = Order::parse_or_default(holder.and_then(|id| ctx.doc.attribute(id, "order")));
    when(order != Order::Explicit, || {
        ValidationWarning::warning(
            "Non Explicit Order",
            format!(
                "This element has {} order, which reorders the child elements during \
                 installation. Use Explicit order to avoid this.",
                order
            ),
        )
    })
}

fn group_policy(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    let group = Group::from_node(ctx.doc, id);
    let mut required = 0;
    let mut not_usable = 0;
    for option in &group.options {
        if option.type_descriptor.always(OptionType::Required) {
            required += 1;
        } else if option.type_descriptor.always(OptionType::NotUsable) {
            not_usable += 1;
        }
    }

    let warning = if not_usable == group.options.len() {
        match group.policy {
            GroupType::SelectAtLeastOne => Some(ValidationWarning::critical(
                "Not Enough Selectable Options",
                "This group needs at least one selectable option but none are available.",
            )),
            GroupType::SelectExactlyOne => Some(ValidationWarning::critical(
                "Not Enough Selectable Options",
                "This group needs exactly one selectable option but none are available.",
            )),
            _ => None,
        }
    } else if required >= 2 {
        match group.policy {
            GroupType::SelectAtMostOne => Some(ValidationWarning::critical(
                "Too Many Required Options",
                "This group can have one option selected at most but at least two are required.",
            )),
            GroupType::SelectExactlyOne => Some(ValidationWarning::critical(
                "Too Many Required Options",
                "This group can only have exactly one option selected but at least two are required.",
            )),
            _ => None,
        }
    } else {
        None
    };
    warning.into_iter().collect()
}
