//! # Codebase Scanner
//!
//! Finds keyword-tagged lines (TODO, FIXME, ...) across a project so they can
//! be listed in a document's ISSUES section.
//!
//! ## Settings
//!
//! | Key | Effect |
//! |-----|--------|
//! | `Scanner.Keyword` | Adds a keyword (repeatable) |
//! | `Scanner.Exclude` | Adds an exclude pattern, wrapped as `**/<value>/**` |
//! | `Scanner.Include` | Limits scanning to matching paths (default `**/*`) |
//!
//! `.taskp` documents are always excluded so a scan never picks up its own
//! output.
//!
//! ## Concurrency
//!
//! Files are read concurrently through the [`FileProvider`], up to the
//! configured limit. Results are collected in enumeration order, so issues are
//! grouped by file and ascending by line within each file.

mod keywords;
mod provider;
mod memory;
mod workspace_files;

use std::path::Path;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::domain::{
    split_lines, values_for, Issue, Setting, SCANNER_EXCLUDE, SCANNER_INCLUDE, SCANNER_KEYWORD,
};

pub use keywords::KeywordMatcher;
pub use memory::MemoryFiles;
pub use provider::{FileContent, FileProvider};
pub use workspace_files::WorkspaceFiles;
pub(crate) use workspace_files::build_globset;

/// File extension of task documents
pub const DOCUMENT_EXTENSION: &str = "taskp";

/// Exclude pattern that keeps the scanner out of task documents
pub const DOCUMENT_EXCLUDE: &str = "**/*.taskp";

/// Include pattern used when no `Scanner.Include` setting exists
pub const DEFAULT_INCLUDE: &str = "**/*";

/// Default number of files read at once
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Scanner configuration gathered from a document's settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSettings {
    pub keywords: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ScanSettings {
    /// Collects scanner keys from settings, in document order
    pub fn from_settings(settings: &[Setting]) -> Self {
        let keywords = values_for(settings, SCANNER_KEYWORD)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        let mut include: Vec<String> = values_for(settings, SCANNER_INCLUDE)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if include.is_empty() {
            include.push(DEFAULT_INCLUDE.to_string());
        }

        let mut scan = Self {
            keywords,
            include,
            exclude: Vec::new(),
        };
        for value in values_for(settings, SCANNER_EXCLUDE) {
            scan.add_exclude(value);
        }
        scan.add_pattern(DOCUMENT_EXCLUDE);
        scan
    }

    /// Appends extra exclude patterns, normalized the same way as settings
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        for pattern in patterns {
            self.add_exclude(pattern.as_ref());
        }
        self
    }

    /// Returns true if there is at least one keyword to look for
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }

    fn add_exclude(&mut self, raw: &str) {
        for pattern in normalize_exclude(raw) {
            self.add_pattern(&pattern);
        }
    }

    fn add_pattern(&mut self, pattern: &str) {
        if !self.exclude.iter().any(|p| p == pattern) {
            self.exclude.push(pattern.to_string());
        }
    }
}

/// Turns a raw exclude value into glob patterns
///
/// Values already starting with `**/` are kept. Anything else matches both a
/// path with that name (`**/<value>`) and everything below it
/// (`**/<value>/**`).
pub fn normalize_exclude(raw: &str) -> Vec<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Vec::new();
    }
    if value.starts_with("**/") {
        return vec![value.to_string()];
    }

    let value = value.trim_start_matches("./").trim_matches('/');
    if value.is_empty() {
        return Vec::new();
    }
    vec![format!("**/{}", value), format!("**/{}/**", value)]
}

/// Finds the issues in one file's text
pub fn scan_text(matcher: &KeywordMatcher, file: &str, text: &str) -> Vec<Issue> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .filter_map(|(line_number, line)| {
            matcher.first_match(line).map(|keyword| Issue {
                keyword: keyword.to_string(),
                file: file.to_string(),
                line_number,
                content: line.trim().to_string(),
            })
        })
        .collect()
}

/// Scans a project through a [`FileProvider`]
pub struct Scanner<P> {
    provider: P,
    concurrency: usize,
}

impl<P: FileProvider> Scanner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets how many files are read at once (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Scans the project for keyword lines
    ///
    /// Returns nothing when the document has no ISSUES section
    /// (`issues_line_number` is `None`) or no keywords are configured.
    pub async fn scan(
        &self,
        settings: &ScanSettings,
        issues_line_number: Option<usize>,
    ) -> Result<Vec<Issue>> {
        if issues_line_number.is_none() {
            debug!("No ISSUES section, skipping scan");
            return Ok(Vec::new());
        }
        let matcher = KeywordMatcher::new(&settings.keywords);
        if matcher.is_empty() {
            debug!("No scanner keywords configured, skipping scan");
            return Ok(Vec::new());
        }

        let files = self
            .provider
            .find_files(&settings.include, &settings.exclude)
            .await?;
        debug!(files = files.len(), "Scanning files");

        let matcher = &matcher;
        let per_file: Vec<Vec<Issue>> = stream::iter(files)
            .map(move |path| async move { self.scan_file(matcher, &path).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let issues: Vec<Issue> = per_file.into_iter().flatten().collect();
        debug!(issues = issues.len(), "Scan complete");
        Ok(issues)
    }

    async fn scan_file(&self, matcher: &KeywordMatcher, path: &Path) -> Vec<Issue> {
        match self.provider.read_text(path).await {
            FileContent::Text(text) => {
                scan_text(matcher, &self.provider.relative_path(path), &text)
            }
            FileContent::Unreadable => {
                debug!(path = %path.display(), "Skipping unreadable file");
                Vec::new()
            }
        }
    }
}
