use fomod_editor::{NodeId, ValidationWarning};

use super::{Category, CheckRegistry, FnCheck};
use crate::context::CheckContext;

pub(super) fn register(registry: &mut CheckRegistry) {
    registry.add(FnCheck::new("empty-source", Category::File, empty_source));
    registry.add(FnCheck::new("missing-destination", Category::File, missing_destination));
}

fn empty_source(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    if ctx.doc.attribute(id, "source").unwrap_or_default().is_empty() {
        vec![ValidationWarning::critical(
            "Empty Source Field",
            "No source specified, this could lead to problems installing.",
        )]
    } else {
        Vec::new()
    }
}

fn missing_destination(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    if ctx.doc.has_attribute(id, "destination") {
        Vec::new()
    } else {
        vec![ValidationWarning::warning(
            "Missing Destination Field",
            "If omitted, the destination is the same as the source. This may not be intended.",
        )]
    }
}
