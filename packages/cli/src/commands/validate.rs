use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use fomod_linter::assert_valid_bytes;
use fomod_schema::Schema;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Documents, directories or glob patterns to check
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

/// Strict schema check of each document. No corrections are made.
pub fn validate(args: ValidateArgs, schema: Arc<Schema>) -> Result<()> {
    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        bail!("No documents matched {}", args.inputs.join(" "));
    }

    let mut failed = 0;
    for file in &files {
        let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        match assert_valid_bytes(Arc::clone(&schema), &bytes) {
            Ok(()) => println!("{} {}", "✓".green(), file.display()),
            Err(err) => {
                failed += 1;
                println!("{} {}", "✗".red(), file.display());
                println!("    {}", err);
            }
        }
    }

    println!();
    if failed > 0 {
        return Err(anyhow!("{} of {} document(s) are invalid", failed, files.len()));
    }
    println!("{} {} document(s) valid", "Done".green().bold(), files.len());
    Ok(())
}

fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            files.extend(find_xml_files(path));
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            let matches = glob::glob(input).with_context(|| format!("Invalid pattern {}", input))?;
            for entry in matches {
                let entry = entry?;
                if entry.is_file() {
                    files.push(entry);
                }
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn find_xml_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("xml"))
                    .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let fomod = dir.path().join("fomod");
        fs::create_dir_all(&fomod).unwrap();
        fs::write(fomod.join("ModuleConfig.xml"), "<config/>").unwrap();
        fs::write(fomod.join("info.XML"), "<fomod/>").unwrap();
        fs::write(fomod.join("notes.txt"), "").unwrap();

        let from_dir = expand_inputs(&[dir.path().display().to_string()]).unwrap();
        assert_eq!(from_dir.len(), 2);

        let pattern = format!("{}/fomod/*.xml", dir.path().display());
        let from_glob = expand_inputs(&[pattern]).unwrap();
        assert_eq!(from_glob, vec![fomod.join("ModuleConfig.xml")]);
    }
}
