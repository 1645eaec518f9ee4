//! Watch mode
//!
//! Watches a workspace for `.taskp` changes and re-processes the documents
//! that changed. Every document is processed once with a scan at startup;
//! later changes skip the scan unless `--scan` or `watch.scan_on_change` is
//! set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use globset::GlobSet;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::document::{print_report, processor_for};
use super::output::{Output, OutputFormat};
use crate::engine::{ProcessOutcome, ProcessRequest, Processor};
use crate::scan::{build_globset, WorkspaceFiles};
use crate::storage::{is_document, Workspace};

/// Runs the watch loop until the watcher channel closes
pub fn run(runtime: &Runtime, output: &Output, path: &Path, scan: bool) -> Result<()> {
    let workspace = Arc::new(Workspace::discover(path)?);
    let config = workspace.config().project.watch.clone();
    let scan_on_change = scan || config.scan_on_change;
    let processor = Arc::new(processor_for(&workspace));
    let excludes = build_globset(&workspace.config().project.scanner.default_excludes);

    let documents = runtime.block_on(workspace.documents())?;
    for document in documents {
        process_now(runtime, output, &workspace, &processor, &document, ProcessRequest::scan());
    }

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), tx)
        .context("Failed to create file watcher")?;
    debouncer
        .watcher()
        .watch(workspace.root(), RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", workspace.root().display()))?;

    output.success(&format!(
        "Watching {} (debounce: {}ms, scan on change: {})",
        workspace.root().display(),
        config.debounce_ms,
        scan_on_change
    ));

    let request = if scan_on_change {
        ProcessRequest::scan()
    } else {
        ProcessRequest::save()
    };

    // Main event loop
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = changed_documents(&workspace, &excludes, &events);
                if changed.is_empty() {
                    continue;
                }
                debug!(count = changed.len(), "Detected document change(s)");

                for document in changed {
                    let workspace = Arc::clone(&workspace);
                    let processor = Arc::clone(&processor);
                    let format = output.format();
                    runtime.spawn(async move {
                        report_cycle(format, &workspace, &processor, &document, request).await;
                    });
                }
            }
            Ok(Err(error)) => {
                warn!(error = ?error, "Watch error");
            }
            Err(e) => {
                info!(error = %e, "Watcher channel closed");
                break;
            }
        }
    }

    Ok(())
}

fn process_now(
    runtime: &Runtime,
    output: &Output,
    workspace: &Workspace,
    processor: &Processor<WorkspaceFiles>,
    document: &Path,
    request: ProcessRequest,
) {
    match runtime.block_on(processor.process(document, request)) {
        Ok(ProcessOutcome::Processed(report)) => print_report(output, workspace, &report),
        Ok(ProcessOutcome::Skipped) => {}
        Err(e) => output.warning(&format!("{:#}", e)),
    }
}

async fn report_cycle(
    format: OutputFormat,
    workspace: &Workspace,
    processor: &Processor<WorkspaceFiles>,
    document: &Path,
    request: ProcessRequest,
) {
    let output = Output::new(format);

    match processor.process(document, request).await {
        Ok(ProcessOutcome::Processed(report)) => {
            // A write triggers one more event; it reconciles to the same text
            if report.changed {
                print_report(&output, workspace, &report);
            }
        }
        Ok(ProcessOutcome::Skipped) => {
            debug!(document = %document.display(), "Cycle already in flight");
        }
        Err(e) => output.warning(&format!("{:#}", e)),
    }
}

/// Picks the existing, non-excluded documents out of a batch of events
fn changed_documents(
    workspace: &Workspace,
    excludes: &GlobSet,
    events: &[DebouncedEvent],
) -> BTreeSet<PathBuf> {
    events
        .iter()
        .map(|e| &e.path)
        .filter(|path| is_watched(workspace, excludes, path))
        .cloned()
        .collect()
}

fn is_watched(workspace: &Workspace, excludes: &GlobSet, path: &Path) -> bool {
    is_document(path) && path.is_file() && !excludes.is_match(workspace.relative_path(path))
}
