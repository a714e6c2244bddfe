use fomod_editor::{Document, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flag name to flag value, in the order flags were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags {
    map: IndexMap<String, String>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `conditionFlags` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let mut flags = Self::new();
        for flag in doc.find_children(id, "flag") {
            flags.set(
                doc.attribute(flag, "name").unwrap_or_default(),
                doc.text(flag).unwrap_or_default(),
            );
        }
        flags
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.shift_remove(name)
    }

    /// Later values win.
    pub fn merge(&mut self, other: &Flags) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Flags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut flags = Flags::new();
        for (k, v) in iter {
            flags.set(k, v);
        }
        flags
    }
}
