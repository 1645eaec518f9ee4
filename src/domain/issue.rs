//! Scanned issues and the links that point back at them

use serde::{Deserialize, Serialize};

use super::line::parse_issue_link;

/// A source line matching a scanner keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub keyword: String,
    /// Path relative to the workspace root, `/`-separated
    pub file: String,
    /// 0-based line number within `file`
    pub line_number: usize,
    /// The matching line, trimmed
    pub content: String,
}

impl Issue {
    /// Renders the issue as an ISSUES section line
    pub fn render(&self) -> String {
        format!("- {} [{}::{}]", self.content, self.file, self.line_number)
    }
}

/// A navigable `[file::line]` reference found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// 0-based line in the document holding the reference
    pub document_line: usize,
    pub file: String,
    pub line: usize,
}

/// Collects every issue link in a document, top to bottom
pub fn collect_links<S: AsRef<str>>(lines: &[S]) -> Vec<IssueLink> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(document_line, text)| {
            parse_issue_link(text.as_ref()).map(|(file, line)| IssueLink {
                document_line,
                file,
                line,
            })
        })
        .collect()
}
