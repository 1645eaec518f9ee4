//! Document model for `.taskp` files
//!
//! Contains the parsing and reconciliation logic without any I/O concerns.

mod id;
mod issue;
mod line;
mod parser;
mod reconcile;
mod section;
mod setting;
mod task;

pub use id::{IdError, IdGenerator, IdSpace, TaskId, ID_WIDTH, MAX_ID};
pub use issue::{collect_links, Issue, IssueLink};
pub use line::{
    match_setting, match_task, match_user, parse_issue_link, rewrite_task_id, SettingLine,
    TaskLine, UserLine,
};
pub use parser::{
    parse, parse_with_rng, split_lines, DocumentParser, ParseError, ParseOptions, ParseResult,
    Preamble,
};
pub use reconcile::splice_issues;
pub use section::{classify_header, Section, SectionClassifier, Transition};
pub use setting::{values_for, Setting, SCANNER_EXCLUDE, SCANNER_INCLUDE, SCANNER_KEYWORD};
pub use task::Task;
