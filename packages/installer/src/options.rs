use std::fmt;
use std::path::Path;

use fomod_common::{FileSystem, RealFileSystem};
use fomod_semantics::{FileStateQuery, NoFiles};

/// What the installer knows about the world outside the document.
#[derive(Clone, Copy)]
pub struct InstallerOptions<'a> {
    /// Compared against version dependencies. Without one they hold.
    pub game_version: Option<&'a str>,
    pub file_state: &'a dyn FileStateQuery,
    /// Package root. When set, folder sources are expanded into files.
    pub package: Option<&'a Path>,
    pub fs: &'a dyn FileSystem,
}

impl<'a> InstallerOptions<'a> {
    pub fn new() -> Self {
        Self {
            game_version: None,
            file_state: &NoFiles,
            package: None,
            fs: &RealFileSystem,
        }
    }

    pub fn with_game_version(mut self, version: &'a str) -> Self {
        self.game_version = Some(version);
        self
    }

    pub fn with_file_state(mut self, query: &'a dyn FileStateQuery) -> Self {
        self.file_state = query;
        self
    }

    pub fn with_package(mut self, package: &'a Path, fs: &'a dyn FileSystem) -> Self {
        self.package = Some(package);
        self.fs = fs;
        self
    }
}

impl Default for InstallerOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstallerOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerOptions")
            .field("game_version", &self.game_version)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}
