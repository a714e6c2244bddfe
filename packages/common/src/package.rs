//! Locating the installer documents inside a mod package.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CommonError;
use crate::filesystem::FileSystem;
use crate::result::CommonResult;

pub const INSTALLER_FOLDER: &str = "fomod";
pub const CONFIG_FILE: &str = "ModuleConfig.xml";
pub const INFO_FILE: &str = "info.xml";

/// Where a package keeps its installer documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerFiles {
    /// Package root, the folder that holds the payload.
    pub root: PathBuf,
    pub config: PathBuf,
    pub info: Option<PathBuf>,
}

/// Find the installer documents for `path`.
///
/// `path` may be the package root (containing a `fomod` folder) or the
/// `fomod` folder itself. Names are matched case-insensitively.
pub fn find_installer_files(fs: &dyn FileSystem, path: &Path) -> CommonResult<InstallerFiles> {
    let (root, folder) = if is_installer_folder(path) && fs.is_dir(path) {
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        (root, path.to_path_buf())
    } else {
        let folder = find_entry(fs, path, INSTALLER_FOLDER, true)?
            .ok_or_else(|| CommonError::NotAPackage(path.to_path_buf()))?;
        (path.to_path_buf(), folder)
    };

    let config = find_entry(fs, &folder, CONFIG_FILE, false)?
        .ok_or_else(|| CommonError::MissingConfig(folder.clone()))?;
    let info = find_entry(fs, &folder, INFO_FILE, false)?;
    debug!(config = %config.display(), has_info = info.is_some(), "found installer files");

    Ok(InstallerFiles { root, config, info })
}

fn is_installer_folder(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().eq_ignore_ascii_case(INSTALLER_FOLDER))
        .unwrap_or(false)
}

fn find_entry(
    fs: &dyn FileSystem,
    dir: &Path,
    name: &str,
    want_dir: bool,
) -> CommonResult<Option<PathBuf>> {
    if !fs.is_dir(dir) {
        return Err(CommonError::NotAPackage(dir.to_path_buf()));
    }
    let found = fs.list_dir(dir)?.into_iter().find(|entry| {
        entry.is_dir == want_dir && entry.path.to_string_lossy().eq_ignore_ascii_case(name)
    });
    Ok(found.map(|entry| dir.join(entry.path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MockFileSystem;

    #[test]
    fn test_finds_documents_under_package_root() {
        let fs = MockFileSystem::new()
            .with_file("mod/fomod/ModuleConfig.xml")
            .with_file("mod/fomod/info.xml")
            .with_file("mod/data.esp");

        let files = find_installer_files(&fs, Path::new("mod")).unwrap();
        assert_eq!(files.root, PathBuf::from("mod"));
        assert_eq!(files.config, PathBuf::from("mod/fomod/ModuleConfig.xml"));
        assert_eq!(files.info, Some(PathBuf::from("mod/fomod/info.xml")));
    }

    #[test]
    fn test_accepts_installer_folder_and_any_case() {
        let fs = MockFileSystem::new().with_file("mod/FOMOD/moduleconfig.XML");

        let files = find_installer_files(&fs, Path::new("mod/FOMOD")).unwrap();
        assert_eq!(files.root, PathBuf::from("mod"));
        assert_eq!(files.config, PathBuf::from("mod/FOMOD/moduleconfig.XML"));
        assert_eq!(files.info, None);
    }

    #[test]
    fn test_missing_folder_or_config() {
        let fs = MockFileSystem::new()
            .with_file("plain/data.esp")
            .with_dir("empty/fomod");

        assert!(matches!(
            find_installer_files(&fs, Path::new("plain")),
            Err(CommonError::NotAPackage(_))
        ));
        assert!(matches!(
            find_installer_files(&fs, Path::new("empty")),
            Err(CommonError::MissingConfig(_))
        ));
    }
}
