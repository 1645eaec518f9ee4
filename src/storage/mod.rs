//! # Storage Layer
//!
//! Filesystem access for Taskpiea: documents, workspaces, and configuration.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Documents | `.taskp` text | anywhere in the workspace |
//! | Project config | TOML | `<root>/taskpiea.toml` |
//! | Global config | TOML | `<config dir>/taskpiea/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`DocumentStore`] takes an exclusive `fs2` lock before replacing a document
//! - A replace is refused when the document changed since it was read
//! - All document writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Root discovery, config, and starter documents
//! - [`DocumentStore`] - Read/replace `.taskp` documents
//! - [`Config`] - Project and global configuration

mod config;
mod document;
mod workspace;

pub use config::{
    Config, ConfigError, DocumentConfig, GlobalConfig, OutputFormat, ProjectConfig,
    ScannerConfig, WatchConfig, CONFIG_FILE,
};
pub use document::{is_document, Document, DocumentStore};
pub use workspace::{Workspace, WorkspaceError, NEW_DOCUMENT_TEXT};
