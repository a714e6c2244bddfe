use std::collections::BTreeSet;
use std::path::Path;

use fomod_common::{display_posix, to_posix, CONFIG_FILE, INFO_FILE, INSTALLER_FOLDER};
use fomod_editor::{NodeId, ValidationWarning};
use fomod_semantics::Root;

use super::{Category, CheckRegistry, FnCheck};
use crate::context::CheckContext;

pub(super) fn register(registry: &mut CheckRegistry) {
    registry.add(FnCheck::new("empty-tree", Category::Root, empty_tree));
    registry.add(FnCheck::new("unused-files", Category::Root, unused_files));
    registry.add(FnCheck::new("installer-name", Category::Name, installer_name));
}

fn empty_tree(ctx: &CheckContext<'_>, _id: NodeId) -> Vec<ValidationWarning> {
    if Root::from_document(ctx.doc).is_empty() {
        vec![ValidationWarning::warning(
            "Empty Fomod Tree",
            "This fomod is empty, nothing will be installed.",
        )]
    } else {
        Vec::new()
    }
}

fn installer_name(ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
    if ctx.doc.text(id).unwrap_or_default().is_empty() {
        vec![ValidationWarning::warning(
            "Missing Installer Name",
            "This fomod does not have a name.",
        )]
    } else {
        Vec::new()
    }
}

/// Package files that no file, folder or image references.
pub(crate) fn find_unused_files(ctx: &CheckContext<'_>, package: &Path) -> Vec<String> {
    let doc = ctx.doc;
    let mut used_files = BTreeSet::new();
    let mut used_folders = Vec::new();

    for id in doc.descendants(doc.config()) {
        match doc.tag(id) {
            "file" => {
                used_files.insert(normalize(doc.attribute(id, "source").unwrap_or_default()));
            }
            "folder" => {
                let folder = normalize(doc.attribute(id, "source").unwrap_or_default());
                if !folder.is_empty() {
                    used_folders.push(format!("{}/", folder));
                }
            }
            "image" | "moduleImage" => {
                used_files.insert(normalize(doc.attribute(id, "path").unwrap_or_default()));
            }
            _ => {}
        }
    }

    let entries = match ctx.fs.walk(package) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    entries
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| display_posix(&entry.path))
        .filter(|path| !is_installer_document(path))
        .filter(|path| !used_files.contains(&path.to_lowercase()))
        .filter(|path| {
            let lower = path.to_lowercase();
            !used_folders.iter().any(|folder| lower.starts_with(folder.as_str()))
        })
        .collect()
}

fn normalize(path: &str) -> String {
    to_posix(path)
        .trim_start_matches("./")
        .trim_matches('/')
        .to_lowercase()
}

fn is_installer_document(path: &str) -> bool {
    match path.split_once('/') {
        Some((folder, name)) => {
            folder.eq_ignore_ascii_case(INSTALLER_FOLDER)
                && (name.eq_ignore_ascii_case(CONFIG_FILE) || name.eq_ignore_ascii_case(INFO_FILE))
        }
        None => false,
    }
}

fn unused_files(ctx: &CheckContext<'_>, _id: NodeId) -> Vec<ValidationWarning> {
    let package = match ctx.package {
        Some(package) => package,
        None => return Vec::new(),
    };
    let unused = find_unused_files(ctx, package);
    if unused.is_empty() {
        return Vec::new();
    }

    let mut message =
        "The following file(s) are included within the package but are not used:".to_string();
    for path in &unused {
        message.push_str("\n    ");
        message.push_str(path);
    }
    vec![ValidationWarning::warning("Unused Files", message)]
}
