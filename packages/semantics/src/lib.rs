//! # FOMOD Semantics
//!
//! Typed meaning on top of the raw document tree: enumerations, conditions,
//! file and flag maps, option types and the page/group/option hierarchy.
//!
//! Everything here is read-only. Condition evaluation is pure and total
//! given an [`EvalContext`] snapshot.

pub mod conditions;
pub mod enums;
pub mod files;
pub mod flags;
pub mod types;
pub mod version;
pub mod views;

pub use conditions::{Condition, Conditions, EvalContext, FileStateQuery, NoFiles};
pub use enums::{ConditionType, FileType, GroupType, OptionType, Order, UnknownVariant};
pub use files::{is_folder, Files};
pub use flags::Flags;
pub use types::{FilePatterns, Type, TypeDescriptor};
pub use version::compare_versions;
pub use views::{info_text, Group, Info, Page, Plugin, Root};
