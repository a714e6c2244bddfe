use fomod_editor::{NodeId, ValidationWarning};

use super::{Category, CheckRegistry, FnCheck};
use crate::context::CheckContext;

pub(super) fn register(registry: &mut CheckRegistry) {
    registry.add(FnCheck::new("empty-conditions", Category::Conditions, empty_conditions));
    registry.add(FnCheck::new("empty-dependency", Category::Conditions, empty_dependencies));
    registry.add(FnCheck::new("impossible-flag", Category::Conditions, impossible_flags));
    registry.add(FnCheck::new("useless-flag", Category::Conditions, useless_flags));
}

fn empty_conditions(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    if ctx.doc.children(id).map(|c| c.is_empty()).unwrap_or(true) {
        vec![ValidationWarning::warning(
            "Empty Conditions",
            "This element should have at least one condition present.",
        )]
    } else {
        Vec::new()
    }
}

fn empty_dependencies(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    let doc = ctx.doc;
    let mut warnings = Vec::new();
    for child in doc.children(id).unwrap_or_default() {
        let child = *child;
        let empty = |name: &str| doc.attribute(child, name).unwrap_or_default().is_empty();
        match doc.tag(child) {
            "gameDependency" | "fommDependency" if empty("version") => {
                warnings.push(ValidationWarning::warning(
                    "Empty Version Dependency",
                    "This version dependency is empty.",
                ))
            }
            "fileDependency" if empty("file") => warnings.push(ValidationWarning::warning(
                "Empty File Dependency",
                "This file dependency depends on no file, may not work correctly.",
            )),
            _ => {}
        }
    }
    warnings
}

fn flag_dependencies(ctx: &CheckContext<'_>, id: NodeId) -> Vec<String> {
    ctx.doc
        .find_children(id, "flagDependency")
        .into_iter()
        .map(|dep| ctx.doc.attribute(dep, "flag").unwrap_or_default().to_string())
        .collect()
}

fn impossible_flags(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    flag_dependencies(ctx, id)
        .into_iter()
        .filter(|flag| !ctx.is_flag_set(flag))
        .map(|flag| {
            ValidationWarning::critical(
                "Impossible Flag",
                format!("The flag '{}' is never created or set.", flag),
            )
        })
        .collect()
}

/// Flags cannot have been set before the installer starts.
fn useless_flags(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    if ctx.doc.tag(id) != "moduleDependencies" {
        return Vec::new();
    }
    flag_dependencies(ctx, id)
        .into_iter()
        .map(|flag| {
            ValidationWarning::critical(
                "Impossible Flag",
                format!("Flag {} shouldn't be used here since it can't have been set.", flag),
            )
        })
        .collect()
}
