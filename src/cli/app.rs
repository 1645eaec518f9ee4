//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{document, watch};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "taskp")]
#[command(author, version, about = "Plain-text task lists that stay in sync with your codebase")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global `default_format`)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace (writes taskpiea.toml)
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Create a starter document at the workspace root and scan it
    New {
        /// Document name (defaults to tasks.taskp)
        name: Option<String>,
    },

    /// Assign task ids, rescan the codebase, and update a document
    Process {
        /// Document to process
        file: PathBuf,

        /// Keep the ISSUES section as is
        #[arg(long)]
        no_scan: bool,

        /// Print the reconciled document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the tasks in a document
    ///
    /// Tasks without a saved id are listed with "-----" (JSON: "generated":
    /// true). Run `taskp process` to write ids into the document.
    Tasks {
        file: PathBuf,
    },

    /// List the users in a document
    Users {
        file: PathBuf,
    },

    /// Complete an @user mention
    Complete {
        file: PathBuf,

        /// Line text up to the caret, e.g. "- Fix login @al"
        #[arg(allow_hyphen_values = true)]
        line_prefix: String,
    },

    /// List [file::line] issue links in a document
    Links {
        file: PathBuf,
    },

    /// Re-process documents whenever they change
    Watch {
        /// Directory inside the workspace (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Rescan the codebase on every change
        #[arg(long)]
        scan: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "taskpiea=debug"
    } else {
        "taskpiea=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Init { path } => document::init(&output, &path)?,

        Commands::New { name } => runtime.block_on(document::new_document(&output, name.as_deref()))?,

        Commands::Process {
            file,
            no_scan,
            dry_run,
        } => runtime.block_on(document::process(&output, &file, !no_scan, dry_run))?,

        Commands::Tasks { file } => runtime.block_on(document::tasks(&output, &file))?,
        Commands::Users { file } => runtime.block_on(document::users(&output, &file))?,

        Commands::Complete { file, line_prefix } => {
            runtime.block_on(document::complete(&output, &file, &line_prefix))?
        }

        Commands::Links { file } => runtime.block_on(document::links(&output, &file))?,

        Commands::Watch { path, scan } => watch::run(&runtime, &output, &path, scan)?,
    }

    Ok(())
}
