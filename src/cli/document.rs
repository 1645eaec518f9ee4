//! Document commands
//!
//! Every command resolves the workspace from the document it is given, so
//! scans run over the tree the document belongs to.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use super::output::Output;
use crate::engine::{ProcessOutcome, ProcessReport, ProcessRequest, Processor, ProcessorOptions};
use crate::scan::WorkspaceFiles;
use crate::storage::Workspace;

/// Default name for `taskp new`
pub const DEFAULT_DOCUMENT_NAME: &str = "tasks.taskp";

/// Shown by `taskp tasks` in place of an id that is not in the document yet
const UNSAVED_ID: &str = "-----";

pub(crate) fn processor_for(workspace: &Workspace) -> Processor<WorkspaceFiles> {
    Processor::new(
        workspace.files(),
        ProcessorOptions::from(&workspace.config().project),
    )
}

async fn run_cycle(
    processor: &Processor<WorkspaceFiles>,
    file: &Path,
    request: ProcessRequest,
) -> Result<ProcessReport> {
    match processor.process(file, request).await? {
        ProcessOutcome::Processed(report) => Ok(report),
        ProcessOutcome::Skipped => bail!("{} is already being processed", file.display()),
    }
}

/// Parses a document without writing it
async fn inspect(file: &Path) -> Result<(Processor<WorkspaceFiles>, ProcessReport)> {
    let workspace = Workspace::for_document(file)?;
    let processor = processor_for(&workspace);
    let report = run_cycle(&processor, file, ProcessRequest::inspect()).await?;
    Ok((processor, report))
}

/// Prints a one-line summary of a cycle
pub(crate) fn print_report(output: &Output, workspace: &Workspace, report: &ProcessReport) {
    if output.is_json() {
        output.data(report);
        return;
    }

    let name = workspace.relative_path(&report.document);
    let issues = match report.issues {
        Some(count) => format!(", {} issue(s)", count),
        None => String::new(),
    };
    let status = if report.written {
        "updated"
    } else if report.changed {
        "not written"
    } else {
        "unchanged"
    };
    output.success(&format!(
        "{}: {} task(s){} ({})",
        name,
        report.tasks.len(),
        issues,
        status
    ));
}

pub fn init(output: &Output, path: &Path) -> Result<()> {
    let workspace = Workspace::init(path)?;
    output.success(&format!(
        "Initialized taskpiea workspace at {}",
        workspace.root().display()
    ));
    Ok(())
}

pub async fn new_document(output: &Output, name: Option<&str>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let path = workspace.create_document(name.unwrap_or(DEFAULT_DOCUMENT_NAME))?;

    let processor = processor_for(&workspace);
    let report = run_cycle(&processor, &path, ProcessRequest::scan()).await?;

    if output.is_json() {
        output.data(&report);
    } else {
        output.success(&format!(
            "Created {} ({} issue(s) found)",
            workspace.relative_path(&report.document),
            report.issues.unwrap_or(0)
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct DryRun<'a> {
    #[serde(flatten)]
    report: &'a ProcessReport,
    text: &'a str,
}

pub async fn process(output: &Output, file: &Path, scan: bool, dry_run: bool) -> Result<()> {
    let workspace = Workspace::for_document(file)?;
    let processor = processor_for(&workspace);
    let request = ProcessRequest {
        use_scanner: scan,
        write: !dry_run,
    };
    let report = run_cycle(&processor, file, request).await?;

    if dry_run {
        if output.is_json() {
            output.data(&DryRun {
                report: &report,
                text: &report.text,
            });
        } else {
            println!("{}", report.text);
        }
        return Ok(());
    }

    if report.changed && !report.written {
        output.warning(&format!(
            "{} changed while it was being processed; nothing was written",
            file.display()
        ));
    }
    print_report(output, &workspace, &report);
    Ok(())
}

pub async fn tasks(output: &Output, file: &Path) -> Result<()> {
    let (_, report) = inspect(file).await?;

    if output.is_json() {
        output.data(&report.tasks);
    } else if report.tasks.is_empty() {
        println!("No tasks");
    } else {
        for task in &report.tasks {
            let id = if task.generated { UNSAVED_ID } else { task.id.as_str() };
            output.row(&[id, &task.name]);
        }
    }
    Ok(())
}

pub async fn users(output: &Output, file: &Path) -> Result<()> {
    let (_, report) = inspect(file).await?;

    if output.is_json() {
        output.data(&report.users);
    } else {
        for user in &report.users {
            println!("{}", user);
        }
    }
    Ok(())
}

pub async fn complete(output: &Output, file: &Path, line_prefix: &str) -> Result<()> {
    let (processor, report) = inspect(file).await?;
    let users = processor.complete_users(&report.document, line_prefix);

    if output.is_json() {
        output.data(&users);
    } else {
        for user in &users {
            println!("{}", user);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct LinkTarget {
    document_line: usize,
    file: String,
    line: usize,
    /// Absolute path of the linked file
    path: PathBuf,
}

pub async fn links(output: &Output, file: &Path) -> Result<()> {
    let workspace = Workspace::for_document(file)?;
    let processor = processor_for(&workspace);
    let report = run_cycle(&processor, file, ProcessRequest::inspect()).await?;

    let targets: Vec<LinkTarget> = report
        .links
        .iter()
        .map(|link| LinkTarget {
            document_line: link.document_line,
            file: link.file.clone(),
            line: link.line,
            path: workspace.root().join(&link.file),
        })
        .collect();

    if output.is_json() {
        output.data(&targets);
    } else {
        for target in &targets {
            output.row(&[
                &target.document_line.to_string(),
                &format!("{}::{}", target.file, target.line),
            ]);
        }
    }
    Ok(())
}
