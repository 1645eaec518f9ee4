//! Per-section line grammars
//!
//! Each matcher is pure: it inspects one line and returns a tagged result.
//! Rewriting lines is left to the document parser.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::id::TaskId;

static TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*- (.+?)(?: \[#([A-Z0-9]{5})\])?\s*$").expect("valid task regex")
});

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*- ").expect("valid bullet regex"));

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.+?)::(\d+)\]").expect("valid link regex"));

/// A task line, or the raw line when it is not a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskLine<'a> {
    Matched {
        name: &'a str,
        /// ID from a trailing ` [#XXXXX]` tag, with its byte range in the line
        id: Option<(TaskId, Range<usize>)>,
    },
    Unmatched(&'a str),
}

/// Matches `- <name>` with an optional trailing ` [#XXXXX]` tag
pub fn match_task(line: &str) -> TaskLine<'_> {
    let Some(caps) = TASK_RE.captures(line) else {
        return TaskLine::Unmatched(line);
    };

    let name = caps.get(1).map_or("", |m| m.as_str()).trim_end();
    let id = caps.get(2).and_then(|m| {
        let id: TaskId = m.as_str().parse().ok()?;
        Some((id, m.range()))
    });

    TaskLine::Matched { name, id }
}

/// Rewrites a task line so its tag carries `id`
///
/// With `existing` set, the tag at that range is replaced in place. Otherwise
/// the tag is appended to the end of the line.
pub fn rewrite_task_id(line: &str, existing: Option<&Range<usize>>, id: &TaskId) -> String {
    match existing {
        Some(range) => format!("{}{}{}", &line[..range.start], id, &line[range.end..]),
        None => format!("{} {}", line, id.tag()),
    }
}

/// A user line, or the raw line when it is not a bullet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLine<'a> {
    Matched { name: &'a str },
    Unmatched(&'a str),
}

/// Matches `- <display name>`
pub fn match_user(line: &str) -> UserLine<'_> {
    match BULLET_RE.find(line) {
        Some(bullet) => {
            let name = line[bullet.end()..].trim();
            if name.is_empty() {
                UserLine::Unmatched(line)
            } else {
                UserLine::Matched { name }
            }
        }
        None => UserLine::Unmatched(line),
    }
}

/// A setting line, or the raw line when it has no colon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingLine<'a> {
    Matched { key: &'a str, value: &'a str },
    Unmatched(&'a str),
}

/// Splits `key: value` on the first colon
pub fn match_setting(line: &str) -> SettingLine<'_> {
    match line.split_once(':') {
        Some((key, value)) => SettingLine::Matched {
            key: key.trim(),
            value: value.trim(),
        },
        None => SettingLine::Unmatched(line),
    }
}

/// Extracts a `[<file>::<line>]` reference from a line
pub fn parse_issue_link(line: &str) -> Option<(String, usize)> {
    let caps = LINK_RE.captures(line)?;
    let line_number = caps[2].parse().ok()?;
    Some((caps[1].to_string(), line_number))
}
