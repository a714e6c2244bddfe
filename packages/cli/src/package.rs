use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fomod_common::{find_installer_files, InstallerFiles, RealFileSystem};
use fomod_editor::{load, Document, ValidationWarning};
use fomod_schema::Schema;
use tracing::debug;

/// An installer read from disk.
pub struct Package {
    pub files: InstallerFiles,
    pub info_bytes: Option<Vec<u8>>,
    pub config_bytes: Vec<u8>,
    pub doc: Document,
    /// Corrections made while loading
    pub warnings: Vec<ValidationWarning>,
}

impl Package {
    pub fn open(path: &Path, schema: Arc<Schema>) -> Result<Self> {
        let files = find_installer_files(&RealFileSystem, path)
            .with_context(|| format!("No installer found at {}", path.display()))?;
        let config_bytes = read(&files.config)?;
        let info_bytes = files.info.as_deref().map(read).transpose()?;

        let (doc, warnings) = load(schema, info_bytes.as_deref(), &config_bytes)
            .with_context(|| format!("Failed to load {}", files.config.display()))?;
        debug!(root = %files.root.display(), warnings = warnings.len(), "opened package");

        Ok(Self {
            files,
            info_bytes,
            config_bytes,
            doc,
            warnings,
        })
    }

    pub fn root(&self) -> &Path {
        &self.files.root
    }

    /// Where the metadata document lives, or would be written.
    pub fn info_path(&self) -> PathBuf {
        match &self.files.info {
            Some(info) => info.clone(),
            None => self
                .files
                .config
                .with_file_name(fomod_common::INFO_FILE),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
