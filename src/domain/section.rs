//! Document sections
//!
//! A section header is a line holding a single bracketed word, e.g. `[TASKS]`,
//! with optional surrounding whitespace. Only the four known names start a new
//! section; any other bracketed word is ordinary content.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[(\w+)\]\s*$").expect("valid header regex"));

/// The region of a document a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    /// Before any recognized header
    #[default]
    None,
    Tasks,
    Issues,
    Users,
    Settings,
}

impl Section {
    /// Returns the name used inside the header brackets
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::None => "NONE",
            Section::Tasks => "TASKS",
            Section::Issues => "ISSUES",
            Section::Users => "USERS",
            Section::Settings => "SETTINGS",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ();

    /// Parses a header name. `NONE` is not a header and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TASKS" => Ok(Section::Tasks),
            "ISSUES" => Ok(Section::Issues),
            "USERS" => Ok(Section::Users),
            "SETTINGS" => Ok(Section::Settings),
            _ => Err(()),
        }
    }
}

/// Returns the section a header line opens, if the line is a known header
pub fn classify_header(line: &str) -> Option<Section> {
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

/// Result of feeding one line to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The line is a known header; the classifier moved to this section
    Enter(Section),
    /// The line is content of the current section
    Stay(Section),
}

/// Tracks the active section while walking a document top to bottom
#[derive(Debug, Clone, Default)]
pub struct SectionClassifier {
    current: Section,
}

impl SectionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances over one line
    pub fn advance(&mut self, line: &str) -> Transition {
        match classify_header(line) {
            Some(section) => {
                self.current = section;
                Transition::Enter(section)
            }
            None => Transition::Stay(self.current),
        }
    }
}
