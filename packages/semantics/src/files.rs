//! Source to destination file mappings.
//!
//! Keys are source paths with `/` separators. A key ending in `/` names a
//! folder. An entry without a destination installs to the same path as
//! its source.

use fomod_common::to_posix;
use fomod_editor::{Document, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Files {
    map: IndexMap<String, String>,
}

impl Files {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `fileList` node (`requiredInstallFiles` or `files`).
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let mut files = Self::new();
        for child in doc.children(id).unwrap_or_default() {
            let source = doc.attribute(*child, "source").unwrap_or_default();
            let destination = match doc.attribute(*child, "destination") {
                Some(destination) => destination.to_string(),
                None => source.to_string(),
            };
            match doc.tag(*child) {
                "folder" => files.insert_folder(source, destination),
                _ => files.insert_file(source, destination),
            }
        }
        files
    }

    pub fn insert_file(&mut self, source: &str, destination: impl Into<String>) {
        let key = to_posix(source).trim_end_matches('/').to_string();
        self.map.insert(key, to_posix(&destination.into()));
    }

    pub fn insert_folder(&mut self, source: &str, destination: impl Into<String>) {
        let mut key = to_posix(source);
        if !key.ends_with('/') {
            key.push('/');
        }
        self.map.insert(key, to_posix(&destination.into()));
    }

    /// Insert with a raw key: a trailing separator marks a folder.
    pub fn insert(&mut self, source: &str, destination: impl Into<String>) {
        if source.ends_with('/') || source.ends_with('\\') {
            self.insert_folder(source, destination)
        } else {
            self.insert_file(source, destination)
        }
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.map.get(source).map(String::as_str)
    }

    pub fn remove(&mut self, source: &str) -> Option<String> {
        self.map.shift_remove(source)
    }

    /// Later entries override earlier ones with the same source.
    pub fn merge(&mut self, other: &Files) {
        for (source, destination) in other.iter() {
            self.map.insert(source.to_string(), destination.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub fn is_folder(source: &str) -> bool {
    source.ends_with('/')
}

impl<'a> FromIterator<(&'a str, &'a str)> for Files {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut files = Files::new();
        for (source, destination) in iter {
            files.insert(source, destination);
        }
        files
    }
}
