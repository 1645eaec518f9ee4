//! Task records derived from the TASKS section

use serde::{Deserialize, Serialize};

use super::id::TaskId;

/// A task entry. The document text is the durable record; tasks are rebuilt
/// on every parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub id: TaskId,
    /// The id was generated by this parse and is not in the document yet
    pub generated: bool,
}

impl Task {
    /// A task whose id was read from its line
    pub fn new(name: impl Into<String>, id: TaskId) -> Self {
        Self {
            name: name.into(),
            id,
            generated: false,
        }
    }

    /// A task that was given a fresh id
    pub fn generated(name: impl Into<String>, id: TaskId) -> Self {
        Self {
            generated: true,
            ..Self::new(name, id)
        }
    }
}
