//! Settings from the SETTINGS section
//!
//! Settings are an ordered list of key/value pairs. Keys may repeat; repeated
//! scanner keys accumulate rather than overwrite.

use serde::{Deserialize, Serialize};

/// Key for a keyword the scanner searches for
pub const SCANNER_KEYWORD: &str = "Scanner.Keyword";

/// Key for a path pattern the scanner skips
pub const SCANNER_EXCLUDE: &str = "Scanner.Exclude";

/// Key for a path pattern the scanner is limited to
pub const SCANNER_INCLUDE: &str = "Scanner.Include";

/// A single `key: value` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returns every value recorded for `key`, in document order
pub fn values_for<'a>(settings: &'a [Setting], key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    settings
        .iter()
        .filter(move |s| s.key == key)
        .map(|s| s.value.as_str())
}
