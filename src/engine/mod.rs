//! # Processing Engine
//!
//! Runs the reconciliation cycle for a document:
//!
//! ```text
//! open -> parse -> scan (optional) -> splice issues -> replace content
//! ```
//!
//! A [`Processor`] holds state shared by every cycle in the process:
//!
//! | State | Keyed by | Purpose |
//! |-------|----------|---------|
//! | In-flight set | document identity | Drops a cycle for a document already mid-cycle |
//! | User cache | document identity | Serves `@user` completion between cycles |
//!
//! Document identity is the canonical path, see [`DocumentStore::identity`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{parse, IdSpace, IssueLink, ParseOptions, Preamble, Setting, Task};
use crate::scan::{FileProvider, ScanSettings, Scanner};
use crate::storage::{DocumentStore, ProjectConfig};

/// Options shared by every cycle of a [`Processor`]
#[derive(Debug, Clone, Default)]
pub struct ProcessorOptions {
    pub preamble: Preamble,
    /// Exclude patterns added to every scan
    pub default_excludes: Vec<String>,
    pub concurrency: Option<usize>,
}

impl From<&ProjectConfig> for ProcessorOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            preamble: config.document.preamble(),
            default_excludes: config.scanner.default_excludes.clone(),
            concurrency: Some(config.scanner.concurrency),
        }
    }
}

/// What a single cycle should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Rescan the codebase and replace the ISSUES section
    pub use_scanner: bool,
    /// Write the result back to the document
    pub write: bool,
}

impl ProcessRequest {
    /// Full cycle: scan and write
    pub fn scan() -> Self {
        Self {
            use_scanner: true,
            write: true,
        }
    }

    /// Assign ids and write, keeping ISSUES as is
    pub fn save() -> Self {
        Self {
            use_scanner: false,
            write: true,
        }
    }

    /// Parse only; nothing is written
    pub fn inspect() -> Self {
        Self {
            use_scanner: false,
            write: false,
        }
    }
}

/// Result of a completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    /// Document identity
    pub document: PathBuf,
    pub tasks: Vec<Task>,
    pub users: Vec<String>,
    pub settings: Vec<Setting>,
    pub links: Vec<IssueLink>,
    /// Number of issues found; `None` when no scan ran
    pub issues: Option<usize>,
    /// True if the reconciled text differs from the document
    pub changed: bool,
    /// True if the document was rewritten
    pub written: bool,
    /// Reconciled document text
    #[serde(skip)]
    pub text: String,
}

/// Outcome of [`Processor::process`]
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// Another cycle for the same document was already running
    Skipped,
    Processed(ProcessReport),
}

/// Removes a document from the in-flight set when dropped
struct InFlight<'a> {
    set: &'a Mutex<HashSet<PathBuf>>,
    key: PathBuf,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Runs reconciliation cycles over documents in one workspace
pub struct Processor<P> {
    store: DocumentStore,
    scanner: Scanner<P>,
    options: ProcessorOptions,
    in_flight: Mutex<HashSet<PathBuf>>,
    users: RwLock<HashMap<PathBuf, Vec<String>>>,
}

impl<P: FileProvider> Processor<P> {
    pub fn new(provider: P, options: ProcessorOptions) -> Self {
        let mut scanner = Scanner::new(provider);
        if let Some(concurrency) = options.concurrency {
            scanner = scanner.with_concurrency(concurrency);
        }

        Self {
            store: DocumentStore::new(),
            scanner,
            options,
            in_flight: Mutex::new(HashSet::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Runs one cycle for the document at `path`
    ///
    /// Returns [`ProcessOutcome::Skipped`] when a cycle for the same document
    /// is already in flight.
    pub async fn process(&self, path: &Path, request: ProcessRequest) -> Result<ProcessOutcome> {
        let identity = self.store.identity(path)?;

        let Some(_guard) = self.begin(&identity) else {
            debug!(document = %identity.display(), "Cycle already in flight, skipping");
            return Ok(ProcessOutcome::Skipped);
        };

        let document = self.store.open_document(&identity)?;

        let options = ParseOptions {
            use_scanner: request.use_scanner,
            preamble: self.options.preamble,
            id_space: IdSpace::default(),
        };
        let mut result = parse(self.store.get_text(&document), &options)
            .with_context(|| format!("Failed to parse {}", identity.display()))?;

        self.remember_users(&identity, &result.users);

        let issues = if request.use_scanner {
            let settings = ScanSettings::from_settings(&result.settings)
                .with_excludes(&self.options.default_excludes);
            let issues = self
                .scanner
                .scan(&settings, result.issues_line_number)
                .await
                .with_context(|| format!("Failed to scan for {}", identity.display()))?;
            result.add_scan_data(Some(&issues));
            Some(issues.len())
        } else {
            None
        };

        let text = result.text();
        let changed = text != document.text();
        let written = changed && request.write && self.store.replace_content(&document, &text);

        info!(
            document = %identity.display(),
            tasks = result.tasks.len(),
            issues = ?issues,
            changed,
            written,
            "Processed document"
        );

        Ok(ProcessOutcome::Processed(ProcessReport {
            document: identity,
            links: result.links(),
            tasks: result.tasks,
            users: result.users,
            settings: result.settings,
            issues,
            changed,
            written,
            text,
        }))
    }

    /// Returns cached users matching the `@` fragment before the caret
    ///
    /// `line_prefix` is the line text up to the caret. Nothing is offered
    /// unless it contains `@`; the text after the last `@` filters users by
    /// case-insensitive prefix.
    pub fn complete_users(&self, identity: &Path, line_prefix: &str) -> Vec<String> {
        let Some(at) = line_prefix.rfind('@') else {
            return Vec::new();
        };
        let fragment = line_prefix[at + 1..].to_lowercase();

        self.users(identity)
            .into_iter()
            .filter(|user| user.to_lowercase().starts_with(&fragment))
            .collect()
    }

    /// Returns the users cached from the last parse of a document
    pub fn users(&self, identity: &Path) -> Vec<String> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    fn remember_users(&self, identity: &Path, users: &[String]) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity.to_path_buf(), users.to_vec());
    }

    fn begin(&self, identity: &Path) -> Option<InFlight<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(identity.to_path_buf()) {
            return None;
        }

        Some(InFlight {
            set: &self.in_flight,
            key: identity.to_path_buf(),
        })
    }
}
