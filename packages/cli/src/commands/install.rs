use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use fomod_common::RealFileSystem;
use fomod_editor::NodeId;
use fomod_installer::{Installer, InstallerOptions, PageView};
use fomod_schema::Schema;
use fomod_semantics::{Files, Flags};
use serde::Serialize;

use super::check::Format;
use crate::config::Config;
use crate::package::Package;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Package root or its fomod folder
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Option to select, as "Page/Group/Option". Repeatable.
    #[arg(short, long = "select", value_name = "PAGE/GROUP/OPTION")]
    pub selections: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    page: String,
    group: String,
    option: String,
}

impl Selection {
    fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(page), Some(group), Some(option)) => Ok(Self {
                page: page.to_string(),
                group: group.to_string(),
                option: option.to_string(),
            }),
            _ => bail!("Selection '{}' is not of the form Page/Group/Option", raw),
        }
    }
}

#[derive(Debug, Serialize)]
struct Plan {
    pages: Vec<String>,
    files: Files,
    flags: Flags,
}

/// Run the installer with the given selections and print the result.
pub fn install(args: InstallArgs, schema: Arc<Schema>, cwd: &Path) -> Result<()> {
    let selections = args
        .selections
        .iter()
        .map(|raw| Selection::parse(raw))
        .collect::<Result<Vec<_>>>()?;

    let package = Package::open(&args.path, schema)?;
    let config = Config::load(package.root(), cwd)?;
    let doc = &package.doc;

    let mut options = InstallerOptions::new()
        .with_file_state(&config)
        .with_package(package.root(), &RealFileSystem);
    if let Some(version) = &config.game_version {
        options = options.with_game_version(version);
    }

    let mut installer = Installer::new(doc, options)?;
    let mut pages = Vec::new();
    let mut page = installer.next(doc, &[])?;
    while let Some(current) = page {
        let chosen = resolve(&current, &selections)?;
        pages.push(current.name.clone());
        page = installer.next(doc, &chosen)?;
    }

    let unused: Vec<&Selection> = selections
        .iter()
        .filter(|selection| !pages.contains(&selection.page))
        .collect();
    if let Some(selection) = unused.first() {
        bail!("Page '{}' was never shown", selection.page);
    }

    let plan = Plan {
        pages,
        files: installer.files(doc)?,
        flags: installer.flags(doc)?,
    };
    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        Format::Text => print_plan(&plan),
    }
    Ok(())
}

fn resolve(page: &PageView, selections: &[Selection]) -> Result<Vec<NodeId>> {
    selections
        .iter()
        .filter(|selection| selection.page == page.name)
        .map(|selection| {
            let group = page.group(&selection.group).ok_or_else(|| {
                anyhow!("Page '{}' has no group '{}'", page.name, selection.group)
            })?;
            let option = group.option(&selection.option).ok_or_else(|| {
                anyhow!("Group '{}' has no option '{}'", group.name, selection.option)
            })?;
            Ok(option.node)
        })
        .collect()
}

fn print_plan(plan: &Plan) {
    println!("{}", "Pages".bright_blue().bold());
    for page in &plan.pages {
        println!("  {}", page);
    }

    println!("{}", "Files".bright_blue().bold());
    if plan.files.is_empty() {
        println!("  {}", "nothing to install".dimmed());
    }
    for (source, destination) in plan.files.iter() {
        println!("  {} {} {}", source, "→".dimmed(), destination);
    }

    if !plan.flags.is_empty() {
        println!("{}", "Flags".bright_blue().bold());
        for (name, value) in plan.flags.iter() {
            println!("  {} = {}", name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            Selection::parse("Options/Textures/2K / 4K").unwrap(),
            Selection {
                page: "Options".to_string(),
                group: "Textures".to_string(),
                option: "2K / 4K".to_string(),
            }
        );
        assert!(Selection::parse("Options/Textures").is_err());
    }
}
