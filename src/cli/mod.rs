//! # Command-Line Interface
//!
//! User-facing `taskp` commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init [path]` | Write a default `taskpiea.toml` |
//! | `new [name]` | Create a starter document and scan the workspace |
//! | `process <file>` | Assign ids, rescan, and rewrite a document |
//! | `tasks`, `users`, `links` | Inspect a document without writing it |
//! | `complete <file> <prefix>` | `@user` completion |
//! | `watch [path]` | Re-process documents as they change |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Without the flag, `default_format` from the global config applies.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. `--verbose` (or `-v`) enables
//! debug logs; `RUST_LOG` overrides both:
//! ```bash
//! RUST_LOG=taskpiea=trace taskp process tasks.taskp
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod document;
mod output;
mod watch;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
