use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use fomod_common::{CONFIG_FILE, INFO_FILE, INSTALLER_FOLDER};
use fomod_editor::{new_document, save};
use fomod_schema::Schema;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Package directory to create the installer in
    pub path: PathBuf,

    /// Installer name, defaults to the directory name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Author written to info.xml
    #[arg(short, long)]
    pub author: Option<String>,

    /// Overwrite existing installer documents
    #[arg(short, long)]
    pub force: bool,
}

pub fn new(args: NewArgs, schema: Arc<Schema>) -> Result<()> {
    let folder = args.path.join(INSTALLER_FOLDER);
    let config_path = folder.join(CONFIG_FILE);
    let info_path = folder.join(INFO_FILE);

    if (config_path.exists() || info_path.exists()) && !args.force {
        bail!(
            "{} already has an installer, use --force to overwrite",
            args.path.display()
        );
    }

    let name = match args.name {
        Some(name) => name,
        None => args
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let mut doc = new_document(schema)?;
    let config = doc.config();
    if let Some(module_name) = doc.find_child(config, "moduleName") {
        doc.set_text(module_name, name.as_str())?;
    }
    let info = doc.info();
    let info_name = doc.add_child(info, "Name")?;
    doc.set_text(info_name, name.as_str())?;
    if let Some(author) = &args.author {
        let node = doc.add_child(info, "Author")?;
        doc.set_text(node, author.as_str())?;
    }

    let (info_bytes, config_bytes) = save(&doc)?;
    fs::create_dir_all(&folder)?;
    fs::write(&info_path, info_bytes)?;
    fs::write(&config_path, config_bytes)?;

    println!("{} {}", "Created installer".green().bold(), name.bright_white());
    println!("  {} {}", "✓".green(), info_path.display());
    println!("  {} {}", "✓".green(), config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::check::{check, CheckArgs, Format};
    use crate::commands::fix::{fix, FixArgs};
    use crate::commands::install::{install, InstallArgs};
    use crate::package::Package;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::fomod())
    }

    #[test]
    fn test_new_package_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Better Rocks");
        let args = NewArgs {
            path: path.clone(),
            name: None,
            author: Some("Someone".to_string()),
            force: false,
        };
        new(args, schema()).unwrap();

        let package = Package::open(&path, schema()).unwrap();
        assert!(package.warnings.is_empty(), "{:?}", package.warnings);
        let info = package.doc.info();
        let name = package.doc.find_child(info, "Name").unwrap();
        assert_eq!(package.doc.text(name), Some("Better Rocks"));

        let again = NewArgs {
            path: path.clone(),
            name: None,
            author: None,
            force: false,
        };
        assert!(new(again, schema()).is_err());
    }

    #[test]
    fn test_commands_on_new_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg");
        let args = NewArgs {
            path: path.clone(),
            name: Some("Pkg".to_string()),
            author: None,
            force: false,
        };
        new(args, schema()).unwrap();

        let check_args = CheckArgs {
            path: path.clone(),
            format: Format::Json,
        };
        // Only non-critical warnings on an empty installer
        check(check_args, schema(), dir.path()).unwrap();

        let install_args = InstallArgs {
            path: path.clone(),
            selections: Vec::new(),
            format: Format::Text,
        };
        install(install_args, schema(), dir.path()).unwrap();

        let bad_selection = InstallArgs {
            path: path.clone(),
            selections: vec!["Missing/Group/Option".to_string()],
            format: Format::Text,
        };
        assert!(install(bad_selection, schema(), dir.path()).is_err());

        let before = fs::read(path.join("fomod").join(CONFIG_FILE)).unwrap();
        fix(FixArgs { path: path.clone(), dry_run: false }, schema()).unwrap();
        let after = fs::read(path.join("fomod").join(CONFIG_FILE)).unwrap();
        assert_eq!(before, after);
    }
}
