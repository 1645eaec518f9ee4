//! Filesystem-backed file enumeration

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

use super::provider::{FileContent, FileProvider};

/// Compiles glob patterns, skipping (and logging) invalid ones
pub(crate) fn build_globset<S: AsRef<str>>(patterns: &[S]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern.as_ref()) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern = pattern.as_ref(), error = %e, "Ignoring invalid glob"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build glob set");
        GlobSet::empty()
    })
}

/// Converts a relative path to a `/`-separated display string
pub(crate) fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Enumerates and reads files below a workspace root
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    root: PathBuf,
}

impl WorkspaceFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(root: &Path, include: &GlobSet, exclude: &GlobSet) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let relative = e.path().strip_prefix(root).unwrap_or(e.path());
                include.is_match(relative) && !exclude.is_match(relative)
            })
            .map(|e| e.into_path())
            .collect();

        files.sort();
        files
    }
}

#[async_trait]
impl FileProvider for WorkspaceFiles {
    async fn find_files(&self, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        let include = build_globset(include);
        let exclude = build_globset(exclude);
        let root = self.root.clone();

        let files = tokio::task::spawn_blocking(move || Self::walk(&root, &include, &exclude))
            .await?;
        Ok(files)
    }

    async fn read_text(&self, path: &Path) -> FileContent {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(_) => return FileContent::Unreadable,
        };

        // NUL bytes mark binary content even when it happens to be valid UTF-8
        if bytes.contains(&0) {
            return FileContent::Unreadable;
        }

        match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(_) => FileContent::Unreadable,
        }
    }

    fn relative_path(&self, path: &Path) -> String {
        display_path(path.strip_prefix(&self.root).unwrap_or(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("src/main.rs"), "// TODO").unwrap();
        fs::write(root.join("src/nested/util.rs"), "// FIXME").unwrap();
        fs::write(root.join("docs/guide.md"), "TODO").unwrap();
        fs::write(root.join("tasks.taskp"), "[ISSUES]").unwrap();
        fs::write(root.join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
        dir
    }

    fn patterns(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn finds_files_honoring_excludes() {
        let dir = setup();
        let files = WorkspaceFiles::new(dir.path());

        let found = files
            .find_files(&patterns(&["**/*"]), &patterns(&["**/*.taskp", "**/docs", "**/docs/**"]))
            .await
            .unwrap();
        let relative: Vec<_> = found.iter().map(|p| files.relative_path(p)).collect();

        assert_eq!(relative, vec!["blob.bin", "src/main.rs", "src/nested/util.rs"]);
    }

    #[tokio::test]
    async fn include_limits_results() {
        let dir = setup();
        let files = WorkspaceFiles::new(dir.path());

        let found = files
            .find_files(&patterns(&["src/**"]), &patterns(&[]))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.starts_with(dir.path().join("src"))));
    }

    #[tokio::test]
    async fn invalid_globs_are_skipped() {
        let dir = setup();
        let files = WorkspaceFiles::new(dir.path());

        let found = files
            .find_files(&patterns(&["**/*.rs", "[invalid"]), &patterns(&["{unclosed"]))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn binary_files_are_unreadable() {
        let dir = setup();
        let files = WorkspaceFiles::new(dir.path());

        assert_eq!(
            files.read_text(&dir.path().join("blob.bin")).await,
            FileContent::Unreadable
        );
        assert_eq!(
            files.read_text(&dir.path().join("missing.rs")).await,
            FileContent::Unreadable
        );
        assert_eq!(
            files.read_text(&dir.path().join("src/main.rs")).await,
            FileContent::Text("// TODO".to_string())
        );
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let files = WorkspaceFiles::new("/work");
        assert_eq!(
            files.relative_path(Path::new("/work/src/nested/util.rs")),
            "src/nested/util.rs"
        );
    }
}
