//! Workspace management
//!
//! A workspace is the directory tree a document's scanner runs over. Its root
//! holds `taskpiea.toml` or `.git`; without either, the directory of the
//! document (or the current directory) is used.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, CONFIG_FILE};
use crate::scan::{FileProvider, WorkspaceFiles, DOCUMENT_EXTENSION};

/// Text of a freshly created document
pub const NEW_DOCUMENT_TEXT: &str = "[TASKS]
- Example task @alice [#A1B2C]
-- example comment

[ISSUES]

[USERS]
- alice

[SETTINGS]
Scanner.Keyword: TODO
Scanner.Keyword: FIXME
Scanner.Keyword: BUG
Scanner.Exclude: *.md
Scanner.Exclude: *.taskp
";

const DEFAULT_CONFIG: &str = r#"# Taskpiea workspace configuration

[scanner]
# Files read at once during a scan
concurrency = 16
# Exclude patterns applied to every scan, on top of Scanner.Exclude settings
default_excludes = ["**/.git/**", "**/target/**", "**/node_modules/**"]

[document]
# Keep lines written above the first section header
keep_preamble = true

[watch]
debounce_ms = 500
# Rescan the codebase each time a document changes
scan_on_change = false
"#;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Document already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid document name: {0:?}")]
    InvalidName(String),

    #[error("Document has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// A Taskpiea workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace rooted at the given path
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root)
            .with_context(|| format!("Failed to resolve workspace: {}", root.display()))?;
        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace containing `start`, falling back to `start` itself
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let start = fs::canonicalize(start)
            .with_context(|| format!("Failed to resolve path: {}", start.display()))?;
        let root = Config::find_project_root(&start).unwrap_or(start);

        Self::open(root)
    }

    /// Opens the workspace a document belongs to
    pub fn for_document(document: impl AsRef<Path>) -> Result<Self> {
        let document = document.as_ref();
        let document = fs::canonicalize(document)
            .with_context(|| format!("Failed to resolve document: {}", document.display()))?;
        let dir = document
            .parent()
            .ok_or_else(|| WorkspaceError::NoParent(document.clone()))?;

        Self::discover(dir)
    }

    /// Opens the workspace containing the current directory
    pub fn open_current() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to get current directory")?;
        Self::discover(cwd)
    }

    /// Initializes a workspace at the given path
    ///
    /// Writes a default `taskpiea.toml` unless one exists.
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the `/`-separated path of `path` relative to the root
    pub fn relative_path(&self, path: &Path) -> String {
        self.files().relative_path(path)
    }

    /// Returns a file provider over this workspace
    pub fn files(&self) -> WorkspaceFiles {
        WorkspaceFiles::new(&self.root)
    }

    /// Creates a starter document at the root
    ///
    /// `.taskp` is appended when missing. Existing files are never overwritten.
    pub fn create_document(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(WorkspaceError::InvalidName(name.to_string()).into());
        }

        let suffix = format!(".{}", DOCUMENT_EXTENSION);
        let file_name = if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        };
        let path = self.root.join(file_name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(WorkspaceError::AlreadyExists(path).into())
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create document: {}", path.display()))
            }
        };

        file.write_all(NEW_DOCUMENT_TEXT.as_bytes())
            .with_context(|| format!("Failed to write document: {}", path.display()))?;

        Ok(path)
    }

    /// Lists every document in the workspace, skipping configured excludes
    pub async fn documents(&self) -> Result<Vec<PathBuf>> {
        let include = vec![format!("**/*.{}", DOCUMENT_EXTENSION)];
        self.files()
            .find_files(&include, &self.config.project.scanner.default_excludes)
            .await
    }
}
