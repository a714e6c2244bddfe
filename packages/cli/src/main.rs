mod commands;
mod config;
mod package;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, fix, install, new, validate, CheckArgs, FixArgs, InstallArgs, NewArgs, ValidateArgs,
};
use fomod_schema::Schema;
use tracing_subscriber::EnvFilter;

/// Create, check and simulate FOMOD mod installers
#[derive(Parser, Debug)]
#[command(name = "fomod")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty installer in a package directory
    New(NewArgs),

    /// Strictly check documents against the schema
    Validate(ValidateArgs),

    /// Report warnings and errors for a package
    Check(CheckArgs),

    /// Simulate an installation
    Install(InstallArgs),

    /// Rewrite a package's documents with every correction applied
    Fix(FixArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let schema = Arc::new(Schema::fomod());
    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::New(args) => new(args, schema),
            Command::Validate(args) => validate(args, schema),
            Command::Check(args) => check(args, schema, &cwd),
            Command::Install(args) => install(args, schema, &cwd),
            Command::Fix(args) => fix(args, schema),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
