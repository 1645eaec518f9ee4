//! Document store for `.taskp` files
//!
//! Reads documents and writes reconciled text back. Writes take an exclusive
//! lock on a `<name>.lock` sidecar, check that the file still holds the text
//! that was processed, and go through a temp file + rename.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{debug, warn};

use crate::scan::DOCUMENT_EXTENSION;

/// A document as it was read from disk
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    fingerprint: blake3::Hash,
}

impl Document {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Hash of the text at read time
    pub fn fingerprint(&self) -> blake3::Hash {
        self.fingerprint
    }
}

/// Outcome of a replace attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replace {
    Written,
    /// The file no longer exists
    Closed,
    /// The file changed after it was read
    Stale,
}

/// Reads and writes task documents
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Returns the identity of a document (its canonical path)
    pub fn identity(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve document: {}", path.display()))
    }

    /// Reads a document
    pub fn open_document(&self, path: &Path) -> Result<Document> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let fingerprint = blake3::hash(text.as_bytes());

        Ok(Document {
            path: path.to_path_buf(),
            text,
            fingerprint,
        })
    }

    pub fn get_text<'a>(&self, document: &'a Document) -> &'a str {
        document.text()
    }

    /// Replaces the whole document with `new_text`
    ///
    /// Returns false, with a warning, when the file is gone, changed since it
    /// was read, or could not be written. Never fails.
    pub fn replace_content(&self, document: &Document, new_text: &str) -> bool {
        match self.try_replace(document, new_text) {
            Ok(Replace::Written) => {
                debug!(path = %document.path.display(), "Document updated");
                true
            }
            Ok(Replace::Closed) => {
                warn!(
                    path = %document.path.display(),
                    "Document was closed before it could be updated"
                );
                false
            }
            Ok(Replace::Stale) => {
                warn!(
                    path = %document.path.display(),
                    "Document changed while it was being processed, update skipped"
                );
                false
            }
            Err(e) => {
                warn!(
                    path = %document.path.display(),
                    error = %format!("{:#}", e),
                    "Failed to update document"
                );
                false
            }
        }
    }

    fn try_replace(&self, document: &Document, new_text: &str) -> Result<Replace> {
        let path = &document.path;
        if !path.exists() {
            return Ok(Replace::Closed);
        }

        // The document itself is replaced by the rename, so writers serialize
        // on a sidecar that stays put
        let lock_path = sibling_path(path, ".lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        lock.lock_exclusive()
            .context("Failed to acquire write lock on document")?;

        let current = match fs::read(path) {
            Ok(current) => current,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Replace::Closed),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to re-read document: {}", path.display()))
            }
        };
        if blake3::hash(&current) != document.fingerprint {
            return Ok(Replace::Stale);
        }

        let temp_path = sibling_path(path, ".tmp");
        if let Err(e) = write_temp(&temp_path, new_text).and_then(|()| {
            fs::rename(&temp_path, path).with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    path.display()
                )
            })
        }) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        // Lock is released when `lock` is dropped
        Ok(Replace::Written)
    }
}

fn write_temp(temp_path: &Path, text: &str) -> Result<()> {
    let mut temp = File::create(temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
    temp.write_all(text.as_bytes())
        .context("Failed to write document")?;
    temp.flush().context("Failed to flush document")
}

/// Returns true if the path names a task document
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// `tasks.taskp` + `.lock` is `tasks.taskp.lock`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}
