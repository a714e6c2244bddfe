//! Package-level error report over a single raw document.
//!
//! Unlike [`crate::validate`], which works on a loaded tree and reports by
//! check category, this pass keys its checkers by tag and verifies that
//! referenced sources and images actually exist inside the package.

use std::path::Path;
use std::sync::Arc;

use fomod_common::{to_posix, FileSystem, RealFileSystem};
use fomod_editor::{load_document, NodeId};
use fomod_schema::Schema;
use fomod_semantics::info_text;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::checks::root::find_unused_files;
use crate::context::CheckContext;
use crate::strict::{assert_valid_bytes, LintError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FomodError {
    pub line: Option<usize>,
    pub title: String,
    pub message: String,
    pub tag: String,
}

/// One kind of error, run on every element whose tag it lists.
pub trait ErrorChecker: Send + Sync {
    fn tags(&self) -> &[&str];

    /// Checkers that look inside the package only run when one is given.
    fn needs_path(&self) -> bool {
        false
    }

    fn check(&self, ctx: &CheckContext<'_>, id: NodeId) -> Vec<FomodError>;
}

type Probe = fn(&CheckContext<'_>, NodeId) -> bool;

/// Reports `title` when `fails` holds for the element.
struct Simple {
    tags: &'static [&'static str],
    needs_path: bool,
    title: &'static str,
    /// `{tag}` is replaced by the element's tag.
    message: &'static str,
    fails: Probe,
}

impl ErrorChecker for Simple {
    fn tags(&self) -> &[&str] {
        self.tags
    }

    fn needs_path(&self) -> bool {
        self.needs_path
    }

    fn check(&self, ctx: &CheckContext<'_>, id: NodeId) -> Vec<FomodError> {
        if !(self.fails)(ctx, id) {
            return Vec::new();
        }
        let tag = ctx.doc.tag(id);
        vec![FomodError {
            line: ctx.doc.line(id),
            title: self.title.to_string(),
            message: self.message.replace("{tag}", tag),
            tag: tag.to_string(),
        }]
    }
}

struct UnusedFiles;

impl ErrorChecker for UnusedFiles {
    fn tags(&self) -> &[&str] {
        &["config"]
    }

    fn needs_path(&self) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>, id: NodeId) -> Vec<FomodError> {
        let package = match ctx.package {
            Some(package) => package,
            None => return Vec::new(),
        };
        let unused = find_unused_files(ctx, package);
        if unused.is_empty() {
            return Vec::new();
        }
        vec![FomodError {
            line: ctx.doc.line(id),
            title: "Unused Files".to_string(),
            message: format!(
                "The following file(s) are included within the package but are not used: {}",
                unused.join(", ")
            ),
            tag: ctx.doc.tag(id).to_string(),
        }]
    }
}

fn info_missing(ctx: &CheckContext<'_>, field: &str) -> bool {
    info_text(ctx.doc, field).map_or(true, |text| text.trim().is_empty())
}

fn no_name(ctx: &CheckContext<'_>, _: NodeId) -> bool {
    info_missing(ctx, "Name")
}

fn no_author(ctx: &CheckContext<'_>, _: NodeId) -> bool {
    info_missing(ctx, "Author")
}

fn no_version(ctx: &CheckContext<'_>, _: NodeId) -> bool {
    info_missing(ctx, "Version")
}

fn no_website(ctx: &CheckContext<'_>, _: NodeId) -> bool {
    info_missing(ctx, "Website")
}

fn empty_installer(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    const CONTENT: [&str; 4] = [
        "moduleDependencies",
        "requiredInstallFiles",
        "installSteps",
        "conditionalFileInstalls",
    ];
    CONTENT.iter().all(|tag| ctx.doc.find_child(id, tag).is_none())
}

fn empty_source(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    ctx.doc.attribute(id, "source").unwrap_or_default().is_empty()
}

fn package_path(ctx: &CheckContext<'_>, id: NodeId, attribute: &str) -> Option<std::path::PathBuf> {
    let value = ctx.doc.attribute(id, attribute).unwrap_or_default();
    if value.is_empty() {
        return None;
    }
    ctx.package.map(|package| package.join(to_posix(value)))
}

fn missing_folder(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    package_path(ctx, id, "source").map_or(false, |path| !ctx.fs.is_dir(&path))
}

fn missing_file(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    package_path(ctx, id, "source").map_or(false, |path| !ctx.fs.is_file(&path))
}

fn missing_image(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    package_path(ctx, id, "path").map_or(false, |path| !ctx.fs.is_file(&path))
}

fn set_flags(ctx: &CheckContext<'_>) -> Vec<NodeId> {
    let doc = ctx.doc;
    doc.descendants(doc.config())
        .into_iter()
        .filter(|id| doc.tag(*id) == "flag")
        .collect()
}

fn mismatched_label(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    let flag = ctx.doc.attribute(id, "flag").unwrap_or_default();
    !ctx.is_flag_set(flag)
}

fn mismatched_value(ctx: &CheckContext<'_>, id: NodeId) -> bool {
    let doc = ctx.doc;
    let flag = doc.attribute(id, "flag").unwrap_or_default();
    if !ctx.is_flag_set(flag) {
        return false;
    }
    let value = doc.attribute(id, "value").unwrap_or_default();
    !set_flags(ctx).into_iter().any(|set| {
        doc.attribute(set, "name") == Some(flag) && doc.text(set).unwrap_or_default() == value
    })
}

fn simple(
    tags: &'static [&'static str],
    needs_path: bool,
    title: &'static str,
    message: &'static str,
    fails: Probe,
) -> Box<dyn ErrorChecker> {
    Box::new(Simple {
        tags,
        needs_path,
        title,
        message,
        fails,
    })
}

/// The built-in checkers, in reporting order per element.
pub fn default_checkers() -> Vec<Box<dyn ErrorChecker>> {
    vec![
        simple(&["fomod"], false, "Installer With No Name", "The installer has no name specified.", no_name),
        simple(&["fomod"], false, "Unsigned Installer", "The installer has no author specified.", no_author),
        simple(&["fomod"], false, "Versionless Installer", "The installer has no version specified.", no_version),
        simple(&["fomod"], false, "Offline Installer", "The installer has no website specified.", no_website),
        simple(&["config"], false, "Empty Installer", "The installer is empty.", empty_installer),
        Box::new(UnusedFiles),
        simple(
            &["file", "folder"],
            false,
            "Empty Source Fields",
            "The source folder(s) under the tag {tag} were empty.",
            empty_source,
        ),
        simple(
            &["folder"],
            true,
            "Missing Source Folders",
            "The source folder(s) under the tag {tag} weren't found inside the package.",
            missing_folder,
        ),
        simple(
            &["file"],
            true,
            "Missing Source Files",
            "The source file(s) under the tag {tag} weren't found inside the package.",
            missing_file,
        ),
        simple(
            &["moduleImage", "image"],
            true,
            "Missing Images",
            "The image(s) under the tag {tag} weren't found inside the package.",
            missing_image,
        ),
        simple(
            &["flagDependency"],
            false,
            "Mismatched Flag Labels",
            "The flag label that {tag} is dependent on is never created during installation.",
            mismatched_label,
        ),
        simple(
            &["flagDependency"],
            false,
            "Mismatched Flag Values",
            "The flag value that {tag} is dependent on is never set.",
            mismatched_value,
        ),
    ]
}

/// Check one raw document against the package at `package`, on disk.
pub fn check_for_errors(
    schema: Arc<Schema>,
    bytes: &[u8],
    package: Option<&Path>,
) -> Result<Vec<FomodError>, LintError> {
    check_for_errors_in(schema, bytes, package, &RealFileSystem)
}

/// The document must be schema-valid; errors come back in document order.
#[instrument(skip_all, fields(package = ?package))]
pub fn check_for_errors_in(
    schema: Arc<Schema>,
    bytes: &[u8],
    package: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<Vec<FomodError>, LintError> {
    assert_valid_bytes(Arc::clone(&schema), bytes)?;
    let (doc, root, _) = load_document(schema, bytes)?;

    let package = package.filter(|path| fs.is_dir(path));
    let mut ctx = CheckContext::new(&doc);
    if let Some(package) = package {
        ctx = ctx.with_package(package, fs);
    }

    let checkers = default_checkers();
    let mut errors = Vec::new();
    for id in doc.descendants(root) {
        let tag = doc.tag(id);
        for checker in &checkers {
            if !checker.tags().contains(&tag) || (checker.needs_path() && package.is_none()) {
                continue;
            }
            errors.extend(checker.check(&ctx, id));
        }
    }
    debug!(errors = errors.len(), "checked document for errors");
    Ok(errors)
}
