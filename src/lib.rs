//! Taskpiea - plain-text task lists kept in sync with a codebase
//!
//! A `.taskp` document has four sections: TASKS, ISSUES, USERS, and SETTINGS.
//! Processing a document gives every task a unique five-character id and
//! refreshes ISSUES with the keyword-tagged lines (TODO, FIXME, ...) found by
//! scanning the workspace.

pub mod domain;
pub mod scan;
pub mod storage;
pub mod engine;
pub mod cli;

pub use domain::{parse, Issue, ParseOptions, ParseResult, Section, Task, TaskId};
pub use engine::{ProcessOutcome, ProcessReport, ProcessRequest, Processor};
