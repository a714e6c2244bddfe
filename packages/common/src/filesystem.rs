use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A file or directory found while listing, relative to the listed folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl Entry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// File system abstraction for path resolution and testing
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Direct children of a directory, sorted by name.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<Entry>>;

    /// Every file and directory below `root`, with paths relative to it, sorted.
    fn walk(&self, root: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut pending = vec![PathBuf::new()];
        while let Some(relative) = pending.pop() {
            for entry in self.list_dir(&root.join(&relative))? {
                let path = relative.join(&entry.path);
                if entry.is_dir {
                    pending.push(path.clone());
                }
                entries.push(Entry {
                    path,
                    is_dir: entry.is_dir,
                });
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Canonicalize a path (resolve symlinks, make absolute)
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Convert an installer path (which may use `\` separators) to `/` form.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Relative path rendered with `/` separators.
pub fn display_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for item in std::fs::read_dir(path)? {
            let item = item?;
            entries.push(Entry {
                path: PathBuf::from(item.file_name()),
                is_dir: item.file_type()?.is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn walk(&self, root: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for item in WalkDir::new(root).min_depth(1).follow_links(true) {
            let item = item.map_err(io::Error::from)?;
            let path = item
                .path()
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| item.path().to_path_buf());
            entries.push(Entry {
                path,
                is_dir: item.file_type().is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Mock file system for testing
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    pub existing_files: HashSet<PathBuf>,
    pub directories: HashSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.add_parents(&path);
        self.existing_files.insert(path);
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path);
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_dir(path);
        self
    }

    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(ancestor.to_path_buf());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.existing_files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        if !self.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", path.display()),
            ));
        }

        let children = |set: &HashSet<PathBuf>, is_dir: bool| -> Vec<Entry> {
            set.iter()
                .filter(|p| p.parent() == Some(path))
                .filter_map(|p| p.file_name())
                .map(|name| Entry {
                    path: PathBuf::from(name),
                    is_dir,
                })
                .collect()
        };

        let mut entries = children(&self.existing_files, false);
        entries.extend(children(&self.directories, true));
        entries.sort();
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // For mock, just return the path as-is
        Ok(path.to_path_buf())
    }
}
