//! Splices scan results into a parsed document

use super::issue::Issue;

/// Replaces the placeholder after the ISSUES header with rendered issues
///
/// `issues_line_number` is the output index of the header; the parser leaves a
/// blank placeholder right after it when scanning. Nothing happens without a
/// header, without scan results, or with an empty result list.
pub fn splice_issues(
    text_data: &mut Vec<String>,
    issues_line_number: Option<usize>,
    issues: Option<&[Issue]>,
) {
    let (Some(header), Some(issues)) = (issues_line_number, issues) else {
        return;
    };
    if issues.is_empty() {
        return;
    }

    let placeholder = header + 1;
    let rendered = issues.iter().map(Issue::render);

    match text_data.get(placeholder) {
        Some(line) if line.is_empty() => {
            text_data.splice(placeholder..=placeholder, rendered);
        }
        _ => {
            let at = placeholder.min(text_data.len());
            text_data.splice(at..at, rendered);
        }
    }
}
