use fomod_editor::ValidationWarning;
use fomod_semantics::{Plugin, TypeDescriptor};

use super::pages::{unnamed, when};
use super::{Category, CheckRegistry, FnCheck};

pub(super) fn register(registry: &mut CheckRegistry) {
    registry.add(FnCheck::new("option-name", Category::Option, |ctx, id| {
        when(unnamed(ctx, id), || {
            ValidationWarning::warning("Empty Option Name", "This option has no name.")
        })
    }));
    registry.add(FnCheck::new("option-description", Category::Option, |ctx, id| {
        let description = ctx
            .doc
            .find_child(id, "description")
            .and_then(|d| ctx.doc.text(d))
            .unwrap_or_default();
        when(description.is_empty(), || {
            ValidationWarning::warning("Empty Option Description", "This option has no description.")
        })
    }));
    registry.add(FnCheck::new("option-does-nothing", Category::Option, |ctx, id| {
        let option = Plugin::from_node(ctx.doc, id);
        when(option.files.is_empty() && option.flags.is_empty(), || {
            ValidationWarning::warning(
                "Option Does Nothing",
                "This option installs no files and sets no flags.",
            )
        })
    }));

    registry.add(FnCheck::new("empty-type", Category::Type, |ctx, id| {
        let parent = ctx.doc.parent(id);
        let empty = match parent.map(|p| TypeDescriptor::from_node(ctx.doc, p)) {
            Some(TypeDescriptor::Conditional(conditional)) => conditional.patterns.is_empty(),
            _ => false,
        };
        when(empty, || {
            ValidationWarning::critical(
                "Empty Type Descriptor",
                "This type descriptor is empty and will never set a type.",
            )
        })
    }));
}
