use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use fomod_common::RealFileSystem;
use fomod_linter::{
    check_for_errors, validate, CheckContext, CheckRegistry, FomodError, LintError, Severity,
    ValidationWarning,
};
use fomod_schema::Schema;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::package::Package;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Package root or its fomod folder
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,
}

#[derive(Debug, Serialize)]
struct Report {
    warnings: Vec<ValidationWarning>,
    errors: Vec<FomodError>,
}

impl Report {
    fn critical(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_critical()).count()
    }
}

/// Loader corrections and validation warnings, followed by package errors
/// for each document.
pub fn check(args: CheckArgs, schema: Arc<Schema>, cwd: &Path) -> Result<()> {
    let package = Package::open(&args.path, Arc::clone(&schema))?;
    let config = Config::load(package.root(), cwd)?;

    let mut registry = CheckRegistry::new();
    for name in &config.disabled_checks {
        if registry.disable(name) == 0 {
            debug!(check = %name, "disabled check does not exist");
        }
    }

    let doc = &package.doc;
    let ctx = CheckContext::new(doc).with_package(package.root(), &RealFileSystem);
    let mut warnings = package.warnings.clone();
    warnings.extend(validate(&ctx, doc.info(), &registry));
    warnings.extend(validate(&ctx, doc.config(), &registry));

    let mut errors = Vec::new();
    let documents = package.info_bytes.iter().chain(Some(&package.config_bytes));
    for bytes in documents {
        match check_for_errors(Arc::clone(&schema), bytes, Some(package.root())) {
            Ok(found) => errors.extend(found),
            // Already reported by the loader
            Err(LintError::Invalid { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let report = Report { warnings, errors };
    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_report(&report, &package),
    }

    let critical = report.critical();
    let others = report.warnings.len() - critical + report.errors.len();
    if critical > 0 || (config.fail_on_warnings && others > 0) {
        return Err(anyhow!(
            "{} critical and {} other issue(s) found",
            critical,
            others
        ));
    }
    Ok(())
}

fn print_report(report: &Report, package: &Package) {
    println!("{}", package.files.config.display().to_string().bright_white());

    for warning in &report.warnings {
        let level = match warning.severity {
            Severity::Critical => "critical".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        let location = match (&warning.tag, warning.line) {
            (Some(tag), Some(line)) => format!("{} line {}", tag, line),
            (Some(tag), None) => tag.clone(),
            (None, Some(line)) => format!("line {}", line),
            (None, None) => String::new(),
        };
        println!("  {} {} {}", level, warning.title.bold(), location.dimmed());
        for line in warning.message.lines() {
            println!("    {}", line);
        }
    }

    for error in &report.errors {
        let location = match error.line {
            Some(line) => format!("{} line {}", error.tag, line),
            None => error.tag.clone(),
        };
        println!("  {} {} {}", "error".red(), error.title.bold(), location.dimmed());
        println!("    {}", error.message);
    }

    if report.warnings.is_empty() && report.errors.is_empty() {
        println!("  {} No issues found!", "✓".green());
    }
    println!();
}
