//! # Installer
//!
//! Walks the pages of a document, recording what the user selected on
//! each, and computes the resulting files and flags.
//!
//! The installer does not hold on to the document. Every call takes the
//! current `&Document` and rebuilds its view of the installer from it, so
//! edits made between calls are picked up. Recorded pages and options that
//! an edit removed are reported as [`InstallerError::StaleNode`].

use std::collections::HashSet;
use std::path::Path;

use fomod_common::{display_posix, FileSystem};
use fomod_editor::{Document, NodeId};
use fomod_semantics::{is_folder, EvalContext, Files, Flags, OptionType, Page, Root};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{InstallerError, InstallerResult};
use crate::options::InstallerOptions;
use crate::view::PageView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    NotStarted,
    OnPage(NodeId),
    Finished,
}

/// A page already shown, with the options chosen on it in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub page: NodeId,
    pub selection: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Installer<'a> {
    options: InstallerOptions<'a>,
    state: State,
    history: Vec<Step>,
}

impl<'a> Installer<'a> {
    /// Fails with [`InstallerError::FailedCondition`] when the module
    /// dependencies do not hold before any flag is set.
    #[instrument(skip_all)]
    pub fn new(doc: &Document, options: InstallerOptions<'a>) -> InstallerResult<Self> {
        let root = Root::from_document(doc);
        let flags = Flags::new();
        let ctx = context(&options, &flags);
        if let Some(conditions) = &root.conditions {
            if !conditions.evaluate(&ctx) {
                debug!("module dependencies not met");
                return Err(InstallerError::FailedCondition);
            }
        }
        Ok(Self {
            options,
            state: State::NotStarted,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// The page currently shown, `None` before starting and once finished.
    pub fn current_page(&self, doc: &Document) -> InstallerResult<Option<PageView>> {
        let page = match self.state {
            State::OnPage(page) => page,
            State::NotStarted | State::Finished => return Ok(None),
        };
        let root = Root::from_document(doc);
        let flags = self.recorded_flags(&root)?;
        let page = root.page(page).ok_or(InstallerError::StaleNode(page))?;
        Ok(Some(PageView::new(page, &context(&self.options, &flags))))
    }

    /// Record `selection` for the current page and move to the next
    /// visible one. Returns `None` once no pages remain.
    ///
    /// The first call starts the installer and must pass no selection.
    #[instrument(skip_all, fields(state = ?self.state, selected = selection.len()))]
    pub fn next(
        &mut self,
        doc: &Document,
        selection: &[NodeId],
    ) -> InstallerResult<Option<PageView>> {
        let root = Root::from_document(doc);
        let mut flags = self.recorded_flags(&root)?;

        let current = match self.state {
            State::Finished => return Ok(None),
            State::NotStarted => {
                if !selection.is_empty() {
                    return Err(InstallerError::InvalidSelection(
                        "the installer has not shown a page yet".to_string(),
                    ));
                }
                None
            }
            State::OnPage(node) => {
                let page = root.page(node).ok_or(InstallerError::StaleNode(node))?;
                let chosen = normalize(page, selection, &context(&self.options, &flags))?;
                for option in chosen.iter().filter_map(|node| page.option(*node)) {
                    flags.merge(&option.flags);
                }
                debug!(page = %page.name, options = chosen.len(), "recorded selection");
                self.history.push(Step {
                    page: node,
                    selection: chosen,
                });
                Some(node)
            }
        };

        let ctx = context(&self.options, &flags);
        let pages = root.ordered_pages();
        let start = match current {
            Some(node) => pages
                .iter()
                .position(|page| page.node == node)
                .map_or(pages.len(), |index| index + 1),
            None => 0,
        };
        match pages[start..].iter().find(|page| page.is_visible(&ctx)) {
            Some(page) => {
                debug!(page = %page.name, "showing page");
                self.state = State::OnPage(page.node);
                Ok(Some(PageView::new(page, &ctx)))
            }
            None => {
                debug!(pages = self.history.len(), "installer finished");
                self.state = State::Finished;
                Ok(None)
            }
        }
    }

    /// Go back to the last page shown. Returns the options selected on it,
    /// or `None` when there is no earlier page.
    #[instrument(skip_all, fields(state = ?self.state))]
    pub fn previous(&mut self) -> Option<Vec<NodeId>> {
        let step = self.history.pop()?;
        debug!(page = %step.page, "back to page");
        self.state = State::OnPage(step.page);
        Some(step.selection)
    }

    /// Flags set by every recorded selection, later ones winning.
    pub fn flags(&self, doc: &Document) -> InstallerResult<Flags> {
        self.recorded_flags(&Root::from_document(doc))
    }

    pub fn files(&self, doc: &Document) -> InstallerResult<Files> {
        self.files_with(doc, &[])
    }

    /// Files to install given the recorded selections plus `pending`, the
    /// options currently chosen on the page being shown.
    ///
    /// Merge order is the required files, then each selected option, then
    /// every conditional install whose conditions hold. Later entries win.
    pub fn files_with(&self, doc: &Document, pending: &[NodeId]) -> InstallerResult<Files> {
        let root = Root::from_document(doc);
        let mut files = root.files.clone();
        let mut flags = Flags::new();

        let mut steps: Vec<(NodeId, &[NodeId])> = self
            .history
            .iter()
            .map(|step| (step.page, step.selection.as_slice()))
            .collect();
        if let (State::OnPage(page), false) = (self.state, pending.is_empty()) {
            steps.push((page, pending));
        }

        for (page, selection) in steps {
            let page = root.page(page).ok_or(InstallerError::StaleNode(page))?;
            for node in selection {
                let option = page.option(*node).ok_or(InstallerError::StaleNode(*node))?;
                files.merge(&option.files);
                flags.merge(&option.flags);
            }
        }
        files.merge(&root.file_patterns.satisfied(&context(&self.options, &flags)));

        Ok(match self.options.package {
            Some(package) => expand_folders(&files, package, self.options.fs),
            None => files,
        })
    }

    fn recorded_flags(&self, root: &Root) -> InstallerResult<Flags> {
        let mut flags = Flags::new();
        for step in &self.history {
            let page = root.page(step.page).ok_or(InstallerError::StaleNode(step.page))?;
            for node in &step.selection {
                let option = page.option(*node).ok_or(InstallerError::StaleNode(*node))?;
                flags.merge(&option.flags);
            }
        }
        Ok(flags)
    }
}

fn context<'c>(options: &InstallerOptions<'c>, flags: &'c Flags) -> EvalContext<'c> {
    EvalContext::new(flags)
        .with_game_version(options.game_version)
        .with_files(options.file_state)
}

/// Check `selection` against the page's groups. Required options are
/// added, and the result is in document order.
fn normalize(page: &Page, selection: &[NodeId], ctx: &EvalContext<'_>) -> InstallerResult<Vec<NodeId>> {
    for node in selection {
        let option = page.option(*node).ok_or_else(|| {
            InstallerError::InvalidSelection(format!(
                "{} is not an option on page '{}'",
                node, page.name
            ))
        })?;
        if option.option_type(ctx) == OptionType::NotUsable {
            return Err(InstallerError::InvalidSelection(format!(
                "option '{}' is not usable",
                option.name
            )));
        }
    }

    let selected: HashSet<NodeId> = selection.iter().copied().collect();
    let mut chosen = Vec::new();
    for group in &page.groups {
        let types: Vec<OptionType> = group.options.iter().map(|option| option.option_type(ctx)).collect();
        let usable = types.iter().filter(|t| **t != OptionType::NotUsable).count();
        let picked: Vec<NodeId> = group
            .options
            .iter()
            .zip(&types)
            .filter(|(option, t)| selected.contains(&option.node) || **t == OptionType::Required)
            .map(|(option, _)| option.node)
            .collect();

        if !group.policy.accepts(picked.len(), usable) {
            return Err(InstallerError::InvalidSelection(format!(
                "group '{}' is {} but {} option(s) were selected",
                group.name,
                group.policy,
                picked.len()
            )));
        }
        chosen.extend(picked);
    }
    Ok(chosen)
}

/// Replace folder entries with the files found under them in the package.
/// Empty or unreadable folders stay as a single folder entry.
fn expand_folders(files: &Files, package: &Path, fs: &dyn FileSystem) -> Files {
    let mut expanded = Files::new();
    for (source, destination) in files.iter() {
        if !is_folder(source) {
            expanded.insert_file(source, destination);
            continue;
        }

        let folder = source.trim_end_matches('/');
        let entries = match fs.walk(&package.join(folder)) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(folder, error = %err, "could not list folder");
                Vec::new()
            }
        };
        let contents: Vec<String> = entries
            .iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| display_posix(&entry.path))
            .collect();
        if contents.is_empty() {
            expanded.insert_folder(source, destination);
            continue;
        }
        for path in contents {
            expanded.insert_file(&join(folder, &path), join(destination, &path));
        }
    }
    expanded
}

fn join(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", base, relative)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fomod_common::MockFileSystem;
    use fomod_editor::load;
    use fomod_schema::Schema;

    use super::*;

    fn document(config: &str) -> Document {
        load(Arc::new(Schema::fomod()), None, config.as_bytes()).unwrap().0
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a.esp"), "a.esp");
        assert_eq!(join("data/", "a.esp"), "data/a.esp");
        assert_eq!(join("data", "sub/a.esp"), "data/sub/a.esp");
    }

    #[test]
    fn test_folder_expansion() {
        let fs = MockFileSystem::new()
            .with_file("pkg/textures/rock.dds")
            .with_file("pkg/textures/sub/sand.dds")
            .with_dir("pkg/empty");
        let doc = document(
            r#"<config><moduleName>M</moduleName><requiredInstallFiles>
            <folder source="textures" destination="data/textures"/>
            <folder source="empty" destination=""/>
            <file source="plugin.esp"/>
            </requiredInstallFiles></config>"#,
        );

        let options = InstallerOptions::new().with_package(Path::new("pkg"), &fs);
        let installer = Installer::new(&doc, options).unwrap();
        let files = installer.files(&doc).unwrap();
        let entries: Vec<(&str, &str)> = files.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("textures/rock.dds", "data/textures/rock.dds"),
                ("textures/sub/sand.dds", "data/textures/sub/sand.dds"),
                ("empty/", ""),
                ("plugin.esp", "plugin.esp"),
            ]
        );

        let unexpanded = Installer::new(&doc, InstallerOptions::new()).unwrap();
        assert_eq!(unexpanded.files(&doc).unwrap().get("textures/"), Some("data/textures"));
    }
}
