use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use fomod_editor::save;
use fomod_schema::Schema;

use crate::package::Package;

#[derive(Debug, Args)]
pub struct FixArgs {
    /// Package root or its fomod folder
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report the corrections without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Load the installer, correcting it, and write both documents back.
pub fn fix(args: FixArgs, schema: Arc<Schema>) -> Result<()> {
    let package = Package::open(&args.path, schema)?;

    for warning in &package.warnings {
        let line = warning.line.map(|line| format!(" (line {})", line)).unwrap_or_default();
        println!("  {} {}{}", "fixed".cyan(), warning.title.bold(), line.dimmed());
        println!("    {}", warning.message);
    }

    if args.dry_run {
        println!("{} {} correction(s) found", "Dry run:".yellow().bold(), package.warnings.len());
        return Ok(());
    }

    let (info_bytes, config_bytes) = save(&package.doc)?;
    let info_path = package.info_path();
    fs::write(&info_path, info_bytes)
        .with_context(|| format!("Failed to write {}", info_path.display()))?;
    fs::write(&package.files.config, config_bytes)
        .with_context(|| format!("Failed to write {}", package.files.config.display()))?;

    println!(
        "{} {} and {}",
        "Rewrote".green().bold(),
        package.files.config.display(),
        info_path.display()
    );
    Ok(())
}
