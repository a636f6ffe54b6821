//! Extraction strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An extraction algorithm variant.
///
/// `Default` is what the extractor uses when asked for no particular
/// strategy; it is never benchmarked on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// The extractor's default ordering.
    Default,
    /// Processes about to interact first.
    InteractionsFirst,
    /// Processes about to branch first.
    ConditionsFirst,
    /// Unmarked processes first.
    UnmarkedFirst,
    /// Unmarked processes, then interacting ones.
    UnmarkedThenInteractions,
    /// Random ordering.
    Random,
    /// Longest process first.
    LongestFirst,
    /// Shortest process first.
    ShortestFirst,
    /// Unmarked processes, then random.
    UnmarkedThenRandom,
    /// Unmarked processes, then selections.
    UnmarkedThenSelections,
    /// Unmarked processes, then conditionals.
    UnmarkedThenConditions,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Default,
        Self::InteractionsFirst,
        Self::ConditionsFirst,
        Self::UnmarkedFirst,
        Self::UnmarkedThenInteractions,
        Self::Random,
        Self::LongestFirst,
        Self::ShortestFirst,
        Self::UnmarkedThenRandom,
        Self::UnmarkedThenSelections,
        Self::UnmarkedThenConditions,
    ];

    /// Every strategy except `Default`.
    #[must_use]
    pub fn benchmarked() -> Vec<Self> {
        Self::ALL.into_iter().filter(|s| *s != Self::Default).collect()
    }

    /// Returns the strategy name as written in file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::InteractionsFirst => "InteractionsFirst",
            Self::ConditionsFirst => "ConditionsFirst",
            Self::UnmarkedFirst => "UnmarkedFirst",
            Self::UnmarkedThenInteractions => "UnmarkedThenInteractions",
            Self::Random => "Random",
            Self::LongestFirst => "LongestFirst",
            Self::ShortestFirst => "ShortestFirst",
            Self::UnmarkedThenRandom => "UnmarkedThenRandom",
            Self::UnmarkedThenSelections => "UnmarkedThenSelections",
            Self::UnmarkedThenConditions => "UnmarkedThenConditions",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a strategy name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown strategy: {0}")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}
