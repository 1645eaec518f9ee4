//! Whole-word, case-insensitive keyword matching

use regex::Regex;

/// Matches scanner keywords against source lines
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    /// Builds a matcher. Blank keywords are ignored; order is kept.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .filter_map(|k| Regex::new(&word_pattern(k)).ok().map(|re| (k.to_string(), re)))
            .collect();

        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Returns the first keyword, in configured order, found in `line`
    pub fn first_match(&self, line: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|(_, re)| re.is_match(line))
            .map(|(keyword, _)| keyword.as_str())
    }
}

/// Word boundaries only apply on sides where the keyword has a word character
fn word_pattern(keyword: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let start = keyword.chars().next().is_some_and(is_word);
    let end = keyword.chars().last().is_some_and(is_word);

    format!(
        "(?i){}{}{}",
        if start { r"\b" } else { "" },
        regex::escape(keyword),
        if end { r"\b" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_word_case_insensitive() {
        let matcher = KeywordMatcher::new(&["TODO"]);

        assert_eq!(matcher.first_match("// TODO: fix"), Some("TODO"));
        assert_eq!(matcher.first_match("# todo: fix"), Some("TODO"));
        assert_eq!(matcher.first_match("Todo"), Some("TODO"));
        assert_eq!(matcher.first_match("(TODO)"), Some("TODO"));
    }

    #[test]
    fn rejects_partial_words() {
        let matcher = KeywordMatcher::new(&["TODO"]);

        assert_eq!(matcher.first_match("TODOLIST"), None);
        assert_eq!(matcher.first_match("mytodo"), None);
        assert_eq!(matcher.first_match("TODO_LATER"), None);
    }

    #[test]
    fn first_configured_keyword_wins() {
        let matcher = KeywordMatcher::new(&["FIXME", "TODO"]);
        assert_eq!(matcher.first_match("TODO and FIXME"), Some("FIXME"));
    }

    #[test]
    fn punctuation_keywords_match_literally() {
        let matcher = KeywordMatcher::new(&["@hack", "C++"]);

        assert_eq!(matcher.first_match("// @HACK around it"), Some("@hack"));
        assert_eq!(matcher.first_match("port to c++ later"), Some("C++"));
        assert_eq!(matcher.first_match("C plus plus"), None);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let matcher = KeywordMatcher::new(&["", "  "]);
        assert!(matcher.is_empty());
        assert_eq!(matcher.first_match("anything"), None);
    }
}
