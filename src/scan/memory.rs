//! In-memory file provider

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use super::provider::{FileContent, FileProvider};
use super::workspace_files::{build_globset, display_path};

/// A [`FileProvider`] over a fixed set of files keyed by relative path
///
/// Useful for embedding the scanner where files do not live on disk, and for
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: BTreeMap<PathBuf, FileContent>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), FileContent::Text(text.into()));
        self
    }

    /// Adds a file that cannot be read as text
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into(), FileContent::Unreadable);
        self
    }
}

#[async_trait]
impl FileProvider for MemoryFiles {
    async fn find_files(&self, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        let include = build_globset(include);
        let exclude = build_globset(exclude);

        Ok(self
            .files
            .keys()
            .filter(|path| include.is_match(path) && !exclude.is_match(path))
            .cloned()
            .collect())
    }

    async fn read_text(&self, path: &Path) -> FileContent {
        self.files
            .get(path)
            .cloned()
            .unwrap_or(FileContent::Unreadable)
    }

    fn relative_path(&self, path: &Path) -> String {
        display_path(path)
    }
}
