//! Case and file identifiers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Tag carried by file ids of fuzzed networks.
pub const FUZZED_TAG: &str = "fuzzed";
/// Tag carried by file ids of unrolled networks.
pub const UNROLLED_TAG: &str = "unrolled";

/// Identifier of one test case inside a corpus file (`C<n>`).
///
/// Ordering follows the numeric suffix, so `C2 < C10 < C29`. Names without a
/// numeric suffix sort after every numbered name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    /// Creates a case id from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing number of the name, if any.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        let digits = self.0.len() - self.0.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        self.0[self.0.len() - digits..].parse().ok()
    }

    fn sort_key(&self) -> (u64, &str) {
        (self.number().unwrap_or(u64::MAX), &self.0)
    }
}

impl Ord for CaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for CaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The part of a file name that follows its stage prefix.
///
/// For corpus files this is a dash-joined numeric tuple (`10-6-0-0`); derived
/// files carry their parameters and tags in front of it
/// (`fuzzed-0-1-10-6-0-0`, `unrolled-10-6-0-0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Creates a file id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id carries the `fuzzed` tag.
    #[must_use]
    pub fn is_fuzzed(&self) -> bool {
        self.has_tag(FUZZED_TAG)
    }

    /// Returns true if the id carries the `unrolled` tag.
    #[must_use]
    pub fn is_unrolled(&self) -> bool {
        self.has_tag(UNROLLED_TAG)
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.0.split('-').any(|segment| segment == tag)
    }

    /// Returns true if the file was derived by a mutation stage.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.is_fuzzed() || self.is_unrolled()
    }

    /// Returns the numeric parts of the id, in order.
    #[must_use]
    pub fn parameters(&self) -> Vec<u64> {
        self.0.split('-').filter_map(|part| part.parse().ok()).collect()
    }

    /// Returns the parameters if the id is a plain numeric tuple.
    #[must_use]
    pub fn corpus_parameters(&self) -> Option<Vec<u64>> {
        self.0
            .split('-')
            .map(|part| part.parse().ok())
            .collect::<Option<Vec<u64>>>()
    }

    /// Prepends a derivation tag and its parameters.
    #[must_use]
    pub fn derived(&self, tag: &str) -> Self {
        Self(format!("{tag}-{}", self.0))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
