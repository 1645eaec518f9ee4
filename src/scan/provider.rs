//! File enumeration boundary used by the scanner

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

/// Result of reading a file for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Binary, undecodable, or failed to read. Skipped without error.
    Unreadable,
}

/// Lists and reads the files of a project
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// Returns every file matching one of `include` and none of `exclude`
    async fn find_files(&self, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>>;

    /// Reads a file as text
    async fn read_text(&self, path: &Path) -> FileContent;

    /// Returns the display path of a file relative to the project root
    fn relative_path(&self, path: &Path) -> String;
}
