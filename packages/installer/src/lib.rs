//! Step-by-step installation over a loaded [`Document`](fomod_editor::Document).
//!
//! ```text
//! NotStarted --next()--> OnPage(first visible page)
//!    OnPage  --next(selection)--> OnPage(next visible page) | Finished
//!    OnPage  <--previous()-------  OnPage | Finished
//! ```
//!
//! An installer never owns or borrows the document between calls. Removing
//! a page or option it has recorded makes later calls fail with
//! [`InstallerError::StaleNode`]; keeping edits and navigation apart is up
//! to the caller.

mod error;
mod installer;
mod options;
mod view;

pub use error::{InstallerError, InstallerResult};
pub use installer::{Installer, State, Step};
pub use options::InstallerOptions;
pub use view::{GroupView, OptionView, PageView};
