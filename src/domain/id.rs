//! Task identifiers
//!
//! ID Format:
//! - Task IDs are written into documents as ` [#XXXXX]`
//! - `XXXXX` is read back with the grammar `[A-Z0-9]{5}`
//! - Freshly generated IDs are always 5-digit uppercase hex (`00000`..=`FFFFF`)
//!
//! IDs are only unique within a single document. Each parse owns an
//! [`IdGenerator`] holding the set of IDs already claimed in that pass.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters in a task ID
pub const ID_WIDTH: usize = 5;

/// Largest value a generated ID can take (5 hex digits)
pub const MAX_ID: u32 = 0xFFFFF;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 5 uppercase alphanumeric characters, got '{0}'")]
    InvalidTaskId(String),

    #[error("ID space exhausted: all {0} IDs are already claimed")]
    Exhausted(u64),
}

/// A 5-character task ID as it appears inside a `[#...]` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Formats a numeric value as a zero-padded uppercase hex ID
    pub fn from_value(value: u32) -> Self {
        Self(format!("{:0width$X}", value, width = ID_WIDTH))
    }

    /// Returns the ID text without the surrounding tag
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the tag form written into documents, e.g. `[#0A3F2]`
    pub fn tag(&self) -> String {
        format!("[#{}]", self.0)
    }

    /// Returns the numeric value if the ID is valid hex
    pub fn value(&self) -> Option<u32> {
        u32::from_str_radix(&self.0, 16).ok()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = s.len() == ID_WIDTH
            && s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if !valid {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Range of values IDs are sampled from (`0..=max`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSpace {
    max: u32,
}

impl IdSpace {
    /// Creates a space of `max + 1` values. `max` is clamped to [`MAX_ID`].
    pub fn new(max: u32) -> Self {
        Self {
            max: max.min(MAX_ID),
        }
    }

    /// Returns the largest value in the space
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns how many distinct IDs the space holds
    pub fn size(&self) -> u64 {
        u64::from(self.max) + 1
    }
}

impl Default for IdSpace {
    fn default() -> Self {
        Self { max: MAX_ID }
    }
}

/// Generates IDs that are unique within one parse pass
pub struct IdGenerator<R = ThreadRng> {
    space: IdSpace,
    claimed: HashSet<TaskId>,
    /// Claimed hex ids that fall inside `space`
    in_space: u64,
    rng: R,
}

impl IdGenerator<ThreadRng> {
    /// Creates a generator over the full 5-hex-digit space
    pub fn new() -> Self {
        Self::with_rng(IdSpace::default(), rand::rng())
    }
}

impl Default for IdGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> IdGenerator<R> {
    /// Creates a generator with an explicit space and random source
    pub fn with_rng(space: IdSpace, rng: R) -> Self {
        Self {
            space,
            claimed: HashSet::new(),
            in_space: 0,
            rng,
        }
    }

    /// Returns true if the ID has already been claimed in this pass
    pub fn is_claimed(&self, id: &TaskId) -> bool {
        self.claimed.contains(id)
    }

    /// Claims an existing ID. Returns false if it was already claimed.
    pub fn claim(&mut self, id: TaskId) -> bool {
        let counts = id.value().is_some_and(|v| v <= self.space.max);
        if !self.claimed.insert(id) {
            return false;
        }
        if counts {
            self.in_space += 1;
        }
        true
    }

    /// Samples until an unclaimed ID is found, then claims it
    pub fn generate(&mut self) -> Result<TaskId, IdError> {
        // Only hex IDs inside the space compete for sampled values
        if self.in_space >= self.space.size() {
            return Err(IdError::Exhausted(self.space.size()));
        }

        loop {
            let id = TaskId::from_value(self.rng.random_range(0..=self.space.max));
            if self.claimed.insert(id.clone()) {
                self.in_space += 1;
                return Ok(id);
            }
        }
    }

    /// Consumes the generator, returning the claimed set
    pub fn into_claimed(self) -> HashSet<TaskId> {
        self.claimed
    }
}
