use std::collections::BTreeSet;
use std::path::Path;

use fomod_common::{FileSystem, RealFileSystem};
use fomod_editor::Document;

/// What checks can see besides the node they run on.
pub struct CheckContext<'a> {
    pub doc: &'a Document,
    /// Package root, when the documents belong to a package on disk.
    pub package: Option<&'a Path>,
    pub fs: &'a dyn FileSystem,
    set_flags: BTreeSet<String>,
}

impl<'a> CheckContext<'a> {
    pub fn new(doc: &'a Document) -> Self {
        let set_flags = doc
            .descendants(doc.config())
            .into_iter()
            .filter(|id| doc.tag(*id) == "flag")
            .filter_map(|id| doc.attribute(id, "name"))
            .map(str::to_string)
            .collect();
        Self {
            doc,
            package: None,
            fs: &RealFileSystem,
            set_flags,
        }
    }

    pub fn with_package(mut self, package: &'a Path, fs: &'a dyn FileSystem) -> Self {
        self.package = Some(package);
        self.fs = fs;
        self
    }

    /// Is `name` set by some option anywhere in the configuration?
    pub fn is_flag_set(&self, name: &str) -> bool {
        self.set_flags.contains(name)
    }
}
