use std::path::Path;

use anyhow::Context;
use fomod_common::to_posix;
use fomod_semantics::{FileStateQuery, FileType};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_NAME: &str = "fomod.config.json";

/// Tool configuration, read from `fomod.config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Game version checked by version dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,

    /// Files reported as active to file dependencies
    #[serde(default)]
    pub active_files: Vec<String>,

    /// Files reported as installed but inactive
    #[serde(default)]
    pub inactive_files: Vec<String>,

    /// Validation checks to skip, by name
    #[serde(default)]
    pub disabled_checks: Vec<String>,

    /// Treat non-critical warnings as failures
    #[serde(default)]
    pub fail_on_warnings: bool,
}

impl Config {
    /// Load the config from `dir`, then from the working directory.
    /// Neither existing means defaults.
    pub fn load(dir: &Path, cwd: &Path) -> anyhow::Result<Self> {
        for candidate in [dir.join(DEFAULT_CONFIG_NAME), cwd.join(DEFAULT_CONFIG_NAME)] {
            if candidate.is_file() {
                return Self::load_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}

fn listed(files: &[String], path: &str) -> bool {
    let path = to_posix(path);
    files.iter().any(|file| to_posix(file).eq_ignore_ascii_case(&path))
}

impl FileStateQuery for Config {
    fn file_state(&self, path: &str) -> FileType {
        if listed(&self.active_files, path) {
            FileType::Active
        } else if listed(&self.inactive_files, path) {
            FileType::Inactive
        } else {
            FileType::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "gameVersion": "1.6.640",
            "activeFiles": ["Skyrim.esm", "Data\\Update.esm"],
            "inactiveFiles": ["Dawnguard.esm"],
            "disabledChecks": ["missing-destination"],
            "failOnWarnings": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.game_version.as_deref(), Some("1.6.640"));
        assert_eq!(config.disabled_checks, vec!["missing-destination"]);
        assert!(config.fail_on_warnings);

        assert_eq!(config.file_state("skyrim.esm"), FileType::Active);
        assert_eq!(config.file_state("Data/Update.esm"), FileType::Active);
        assert_eq!(config.file_state("Dawnguard.esm"), FileType::Inactive);
        assert_eq!(config.file_state("HearthFires.esm"), FileType::Missing);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.fail_on_warnings);
    }

    #[test]
    fn test_load_prefers_package_dir() {
        let package = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join(DEFAULT_CONFIG_NAME), r#"{"gameVersion": "1.0"}"#).unwrap();

        let config = Config::load(package.path(), cwd.path()).unwrap();
        assert_eq!(config.game_version.as_deref(), Some("1.0"));

        std::fs::write(package.path().join(DEFAULT_CONFIG_NAME), r#"{"gameVersion": "2.0"}"#)
            .unwrap();
        let config = Config::load(package.path(), cwd.path()).unwrap();
        assert_eq!(config.game_version.as_deref(), Some("2.0"));

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(empty.path(), empty.path()).unwrap(), Config::default());
    }
}
