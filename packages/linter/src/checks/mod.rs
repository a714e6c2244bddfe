//! Pluggable checks and their registry.

mod conditions;
mod files;
mod options;
mod pages;
pub(crate) mod root;

use std::fmt;

use fomod_editor::{Document, NodeId, ValidationWarning};
use indexmap::IndexMap;

use crate::context::CheckContext;

/// The kind of node a check runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Root,
    Info,
    Name,
    Image,
    Conditions,
    Files,
    File,
    Pages,
    Page,
    Group,
    Option,
    Flags,
    Type,
    FilePatterns,
}

impl Category {
    /// Category of a node, from its tag and declared type.
    pub fn of(doc: &Document, id: NodeId) -> Option<Self> {
        let category = match (doc.tag(id), doc.kind(id)) {
            (_, "moduleConfiguration") => Category::Root,
            (_, "fomodInfo") => Category::Info,
            ("moduleName", _) => Category::Name,
            ("moduleImage", _) => Category::Image,
            (_, "compositeDependency") => Category::Conditions,
            (_, "fileList") => Category::Files,
            ("file" | "folder", "fileType") => Category::File,
            ("installSteps", _) => Category::Pages,
            ("installStep", _) => Category::Page,
            ("group", _) => Category::Group,
            ("plugin", _) => Category::Option,
            ("conditionFlags", _) => Category::Flags,
            ("dependencyType", _) => Category::Type,
            ("conditionalFileInstalls", _) => Category::FilePatterns,
            _ => return None,
        };
        Some(category)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Root => "Root",
            Category::Info => "Info",
            Category::Name => "Name",
            Category::Image => "Image",
            Category::Conditions => "Conditions",
            Category::Files => "Files",
            Category::File => "File",
            Category::Pages => "Pages",
            Category::Page => "Page",
            Category::Group => "Group",
            Category::Option => "Option",
            Category::Flags => "Flags",
            Category::Type => "Type",
            Category::FilePatterns => "FilePatterns",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation check over one node.
pub trait Check: Send + Sync {
    /// Unique identifier within the check's category
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Warnings for `id`. Location is filled in by the caller.
    fn check(&self, ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning>;
}

type CheckFn = dyn Fn(&CheckContext<'_>, NodeId) -> Vec<ValidationWarning> + Send + Sync;

/// A check backed by a function or closure.
pub struct FnCheck {
    name: String,
    category: Category,
    func: Box<CheckFn>,
}

impl FnCheck {
    pub fn new<F>(name: impl Into<String>, category: Category, func: F) -> Self
    where
        F: Fn(&CheckContext<'_>, NodeId) -> Vec<ValidationWarning> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            category,
            func: Box::new(func),
        }
    }
}

impl Check for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn check(&self, ctx: &CheckContext<'_>, id: NodeId) -> Vec<ValidationWarning> {
        (self.func)(ctx, id)
    }
}

/// Checks keyed by category, run in registration order.
pub struct CheckRegistry {
    checks: IndexMap<Category, Vec<Box<dyn Check>>>,
}

impl CheckRegistry {
    /// A registry with every built-in check
    pub fn new() -> Self {
        let mut registry = Self::empty();
        root::register(&mut registry);
        conditions::register(&mut registry);
        files::register(&mut registry);
        pages::register(&mut registry);
        options::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            checks: IndexMap::new(),
        }
    }

    /// Run `check` in addition to everything already registered.
    pub fn add(&mut self, check: impl Check + 'static) {
        self.checks
            .entry(check.category())
            .or_default()
            .push(Box::new(check));
    }

    /// Run `check` instead of the registered check with the same name and
    /// category. Without such a check this is [`CheckRegistry::add`].
    pub fn replace(&mut self, check: impl Check + 'static) {
        let checks = self.checks.entry(check.category()).or_default();
        match checks.iter().position(|c| c.name() == check.name()) {
            Some(index) => checks[index] = Box::new(check),
            None => checks.push(Box::new(check)),
        }
    }

    /// Drop every check called `name`. Returns how many were removed.
    pub fn disable(&mut self, name: &str) -> usize {
        let mut removed = 0;
        for checks in self.checks.values_mut() {
            let before = checks.len();
            checks.retain(|c| c.name() != name);
            removed += before - checks.len();
        }
        removed
    }

    pub fn checks(&self, category: Category) -> &[Box<dyn Check>] {
        self.checks.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Names of every registered check.
    pub fn names(&self) -> Vec<&str> {
        self.checks
            .values()
            .flat_map(|checks| checks.iter().map(|c| c.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.checks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &format!("{} checks", self.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> FnCheck {
        FnCheck::new(name, Category::Option, |_, _| Vec::new())
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = CheckRegistry::new();
        assert!(!registry.is_empty());
        assert!(registry.names().contains(&"option-name"));
        assert!(registry.names().contains(&"group-policy"));
    }

    #[test]
    fn test_add_appends_and_replace_swaps() {
        let mut registry = CheckRegistry::new();
        let before = registry.checks(Category::Option).len();

        registry.add(noop("custom"));
        assert_eq!(registry.checks(Category::Option).len(), before + 1);
        assert_eq!(registry.checks(Category::Option).last().map(|c| c.name()), Some("custom"));

        registry.replace(noop("option-name"));
        assert_eq!(registry.checks(Category::Option).len(), before + 1);
    }

    #[test]
    fn test_disable() {
        let mut registry = CheckRegistry::new();
        assert_eq!(registry.disable("option-name"), 1);
        assert_eq!(registry.disable("option-name"), 0);
        assert!(!registry.names().contains(&"option-name"));
    }
}
