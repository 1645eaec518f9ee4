//! Configuration handling for Taskpiea
//!
//! Configuration is stored in `taskpiea.toml` at the workspace root (project)
//! and `~/.config/taskpiea/config.toml` (global). Both files are optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Preamble;
use crate::scan::DEFAULT_CONCURRENCY;

/// Project configuration file name
pub const CONFIG_FILE: &str = "taskpiea.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Configuration for the codebase scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Files read at once during a scan
    pub concurrency: usize,

    /// Exclude patterns applied on top of each document's settings
    pub default_excludes: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            default_excludes: vec![
                "**/.git/**".to_string(),
                "**/target/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
        }
    }
}

/// Configuration for document rewriting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Keep lines that appear before the first section header
    pub keep_preamble: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            keep_preamble: true,
        }
    }
}

impl DocumentConfig {
    pub fn preamble(&self) -> Preamble {
        if self.keep_preamble {
            Preamble::Keep
        } else {
            Preamble::Drop
        }
    }
}

/// Configuration for `taskp watch`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds before re-processing
    pub debounce_ms: u64,

    /// Rescan the codebase on every document change
    pub scan_on_change: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            scan_on_change: false,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub scanner: ScannerConfig,
    pub document: DocumentConfig,
    pub watch: WatchConfig,
}

impl ProjectConfig {
    /// Checks values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "scanner.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific workspace root
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskpiea", "taskpiea")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;
        Ok(config)
    }

    /// Finds the workspace root by walking up from `start`
    ///
    /// A directory holding `taskpiea.toml` or `.git` is a root.
    pub fn find_project_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(CONFIG_FILE).is_file() || current.join(".git").exists() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = ProjectConfig::default();

        assert_eq!(config.scanner.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.scanner.default_excludes.contains(&"**/.git/**".to_string()));
        assert!(config.document.keep_preamble);
        assert_eq!(config.document.preamble(), Preamble::Keep);
        assert_eq!(config.watch.debounce_ms, 500);
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[scanner]
concurrency = 4
default_excludes = ["**/dist/**"]

[document]
keep_preamble = false
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scanner.concurrency, 4);
        assert_eq!(config.scanner.default_excludes, vec!["**/dist/**"]);
        assert_eq!(config.document.preamble(), Preamble::Drop);
        assert!(!config.watch.scan_on_change);
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn zero_concurrency_is_invalid() {
        let mut config = ProjectConfig::default();
        config.scanner.concurrency = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn load_rejects_invalid_project_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[scanner]\nconcurrency = 0\n").unwrap();

        assert!(Config::load_project_config(dir.path()).is_err());
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_project_config(dir.path()).unwrap();

        assert_eq!(config.scanner.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn git_directory_marks_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();

        let root = Config::find_project_root(&dir.path().join("src"));
        assert_eq!(root.as_deref(), Some(dir.path()));
    }
}
