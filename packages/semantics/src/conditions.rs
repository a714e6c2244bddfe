//! Boolean conditions over flags, file states and the game version.

use std::cmp::Ordering;

use fomod_editor::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::enums::{ConditionType, FileType};
use crate::flags::Flags;
use crate::version::compare_versions;

/// Answers the state of a file in the user's setup.
pub trait FileStateQuery {
    fn file_state(&self, path: &str) -> FileType;
}

impl<F> FileStateQuery for F
where
    F: Fn(&str) -> FileType,
{
    fn file_state(&self, path: &str) -> FileType {
        self(path)
    }
}

/// Every file is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFiles;

impl FileStateQuery for NoFiles {
    fn file_state(&self, _path: &str) -> FileType {
        FileType::Missing
    }
}

/// A snapshot of everything conditions are evaluated against.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub flags: &'a Flags,
    /// `None` means version atoms always hold.
    pub game_version: Option<&'a str>,
    pub files: &'a dyn FileStateQuery,
}

impl<'a> EvalContext<'a> {
    pub fn new(flags: &'a Flags) -> Self {
        Self {
            flags,
            game_version: None,
            files: &NoFiles,
        }
    }

    pub fn with_game_version(mut self, version: Option<&'a str>) -> Self {
        self.game_version = version;
        self
    }

    pub fn with_files(mut self, files: &'a dyn FileStateQuery) -> Self {
        self.files = files;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// The flag must currently hold `value`. An unset flag reads as "".
    Flag { name: String, value: String },
    File { path: String, state: FileType },
    /// Minimum game version.
    Version(String),
    /// Minimum mod manager version. There is no manager to ask, so it holds.
    ManagerVersion(String),
    Nested(Conditions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conditions {
    pub operator: ConditionType,
    pub atoms: Vec<Condition>,
}

impl Conditions {
    pub fn new(operator: ConditionType) -> Self {
        Self {
            operator,
            atoms: Vec::new(),
        }
    }

    pub fn with(mut self, atom: Condition) -> Self {
        self.atoms.push(atom);
        self
    }

    /// Read a `compositeDependency` node.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        let operator = ConditionType::parse_or_default(doc.attribute(id, "operator"));
        let mut atoms = Vec::new();

        for child in doc.children(id).unwrap_or_default() {
            let child = *child;
            let text = |name: &str| doc.attribute(child, name).unwrap_or_default().to_string();
            let atom = match doc.tag(child) {
                "fileDependency" => Condition::File {
                    path: text("file"),
                    state: FileType::parse_or_default(doc.attribute(child, "state")),
                },
                "flagDependency" => Condition::Flag {
                    name: text("flag"),
                    value: text("value"),
                },
                "gameDependency" => Condition::Version(text("version")),
                "fommDependency" => Condition::ManagerVersion(text("version")),
                "dependencies" => Condition::Nested(Conditions::from_node(doc, child)),
                _ => continue,
            };
            atoms.push(atom);
        }
        Self { operator, atoms }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Empty `And` holds, empty `Or` does not.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self.operator {
            ConditionType::And => self.atoms.iter().all(|atom| atom.evaluate(ctx)),
            ConditionType::Or => self.atoms.iter().any(|atom| atom.evaluate(ctx)),
        }
    }

    /// Flag atoms at any depth, with their value.
    pub fn flag_atoms(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for atom in &self.atoms {
            match atom {
                Condition::Flag { name, value } => out.push((name.as_str(), value.as_str())),
                Condition::Nested(inner) => out.extend(inner.flag_atoms()),
                _ => {}
            }
        }
        out
    }
}

impl Condition {
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Condition::Flag { name, value } => {
                ctx.flags.get(name).unwrap_or_default() == value.as_str()
            }
            Condition::File { path, state } => ctx.files.file_state(path) == *state,
            Condition::Version(minimum) => match ctx.game_version {
                Some(version) => compare_versions(version, minimum) != Ordering::Less,
                None => true,
            },
            Condition::ManagerVersion(_) => true,
            Condition::Nested(inner) => inner.evaluate(ctx),
        }
    }
}
