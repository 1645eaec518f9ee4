//! Document parser
//!
//! Walks a `.taskp` document once, top to bottom, and produces the rewritten
//! lines together with the tasks, users and settings found along the way.
//!
//! ## Line handling per section
//!
//! | Section | Recorded as | Emitted line |
//! |---------|-------------|--------------|
//! | none    | -           | kept or dropped, see [`Preamble`] |
//! | TASKS   | [`Task`]    | rewritten with a unique `[#XXXXX]` tag |
//! | ISSUES  | -           | verbatim, or replaced by a placeholder when scanning |
//! | USERS   | user name   | verbatim |
//! | SETTINGS| [`Setting`] | verbatim |

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{IdError, IdGenerator, IdSpace, TaskId};
use super::issue::{collect_links, Issue, IssueLink};
use super::line::{
    match_setting, match_task, match_user, rewrite_task_id, SettingLine, TaskLine, UserLine,
};
use super::reconcile;
use super::section::{Section, SectionClassifier, Transition};
use super::setting::Setting;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Failed to assign task ID on line {line}: {source}")]
    Id {
        line: usize,
        #[source]
        source: IdError,
    },
}

/// What to do with lines that appear before the first section header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preamble {
    /// Emit them unchanged
    #[default]
    Keep,
    /// Remove them from the output
    Drop,
}

/// Options for a single parse
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Clear the ISSUES section so scan results can be spliced in
    pub use_scanner: bool,
    pub preamble: Preamble,
    pub id_space: IdSpace,
}

impl ParseOptions {
    /// Options for a parse that will be followed by a scan
    pub fn scanning() -> Self {
        Self {
            use_scanner: true,
            ..Self::default()
        }
    }
}

/// Everything one parse produces
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Output lines, in order
    pub text_data: Vec<String>,
    /// Output index of the ISSUES header; only set when scanning was requested
    pub issues_line_number: Option<usize>,
    pub tasks: Vec<Task>,
    pub users: Vec<String>,
    pub settings: Vec<Setting>,
    pub claimed_ids: HashSet<TaskId>,
}

impl ParseResult {
    /// Joins the output lines into document text
    pub fn text(&self) -> String {
        self.text_data.join("\n")
    }

    /// Splices scan results into the ISSUES section
    pub fn add_scan_data(&mut self, issues: Option<&[Issue]>) {
        reconcile::splice_issues(&mut self.text_data, self.issues_line_number, issues);
    }

    /// Returns the issue links in the output lines
    pub fn links(&self) -> Vec<IssueLink> {
        collect_links(&self.text_data)
    }
}

/// Splits text on `\n` or `\r\n`
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        if let Some(stripped) = line.strip_suffix('\r') {
            *line = stripped;
        }
    }
    lines
}

/// Parses a document with a thread-local random source
pub fn parse(text: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
    parse_with_rng(text, options, rand::rng())
}

/// Parses a document with an explicit random source for ID generation
pub fn parse_with_rng<R: Rng>(
    text: &str,
    options: &ParseOptions,
    rng: R,
) -> Result<ParseResult, ParseError> {
    let mut parser = DocumentParser::new(*options, rng);
    for (index, line) in split_lines(text).into_iter().enumerate() {
        parser.feed(index, line)?;
    }
    Ok(parser.finish())
}

/// Line-at-a-time parser state
pub struct DocumentParser<R> {
    options: ParseOptions,
    classifier: SectionClassifier,
    ids: IdGenerator<R>,
    result: ParseResult,
}

impl<R: Rng> DocumentParser<R> {
    pub fn new(options: ParseOptions, rng: R) -> Self {
        Self {
            options,
            classifier: SectionClassifier::new(),
            ids: IdGenerator::with_rng(options.id_space, rng),
            result: ParseResult::default(),
        }
    }

    /// Consumes one input line; `index` is its 0-based input position
    pub fn feed(&mut self, index: usize, line: &str) -> Result<(), ParseError> {
        let section = match self.classifier.advance(line) {
            Transition::Enter(section) => {
                self.enter(section, line);
                return Ok(());
            }
            Transition::Stay(section) => section,
        };

        match section {
            Section::None => {
                if self.options.preamble == Preamble::Keep {
                    self.emit(line);
                }
            }
            Section::Tasks => self.task(index, line)?,
            Section::Issues => {
                // Existing entries are regenerated by the scanner
                if !self.options.use_scanner {
                    self.emit(line);
                }
            }
            Section::Users => {
                if let UserLine::Matched { name } = match_user(line) {
                    self.result.users.push(name.to_string());
                }
                self.emit(line);
            }
            Section::Settings => {
                if let SettingLine::Matched { key, value } = match_setting(line) {
                    self.result.settings.push(Setting::new(key, value));
                }
                self.emit(line);
            }
        }

        Ok(())
    }

    /// Finishes the walk and returns the accumulated result
    pub fn finish(mut self) -> ParseResult {
        self.result.claimed_ids = self.ids.into_claimed();
        self.result
    }

    fn enter(&mut self, section: Section, line: &str) {
        self.emit(line);
        if section == Section::Issues && self.options.use_scanner {
            self.result.issues_line_number = Some(self.result.text_data.len() - 1);
            self.emit("");
        }
    }

    fn task(&mut self, index: usize, line: &str) -> Result<(), ParseError> {
        let (name, existing) = match match_task(line) {
            TaskLine::Matched { name, id } => (name, id),
            TaskLine::Unmatched(raw) => {
                self.emit(raw);
                return Ok(());
            }
        };

        let (task, rewritten) = match existing {
            Some((id, range)) => {
                if self.ids.claim(id.clone()) {
                    (Task::new(name, id), line.to_string())
                } else {
                    let id = self.generate(index)?;
                    let rewritten = rewrite_task_id(line, Some(&range), &id);
                    (Task::generated(name, id), rewritten)
                }
            }
            None => {
                let id = self.generate(index)?;
                let rewritten = rewrite_task_id(line, None, &id);
                (Task::generated(name, id), rewritten)
            }
        };

        self.result.tasks.push(task);
        self.result.text_data.push(rewritten);
        Ok(())
    }

    fn generate(&mut self, index: usize) -> Result<TaskId, ParseError> {
        self.ids
            .generate()
            .map_err(|source| ParseError::Id { line: index, source })
    }

    fn emit(&mut self, line: &str) {
        self.result.text_data.push(line.to_string());
    }
}
