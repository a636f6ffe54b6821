//! Soundness verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing an original choreography with its extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The two are equivalent.
    Ok,
    /// The checker gave up before deciding.
    Maybe,
    /// The two are not equivalent.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Maybe => write!(f, "MAYBE"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Running totals of verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTally {
    /// Equivalent pairs.
    pub ok: usize,
    /// Inconclusive pairs.
    pub maybe: usize,
    /// Non-equivalent pairs.
    pub fail: usize,
}

impl VerdictTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one verdict.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Ok => self.ok += 1,
            Verdict::Maybe => self.maybe += 1,
            Verdict::Fail => self.fail += 1,
        }
    }

    /// Returns the number of verdicts counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ok + self.maybe + self.fail
    }
}
