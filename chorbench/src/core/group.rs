//! Corpus-variant groups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{FUZZED_TAG, UNROLLED_TAG};

/// Mutation intensity for one fuzzing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuzzParameters {
    /// Number of deletions to apply.
    pub deletions: u32,
    /// Number of swaps to apply.
    pub swaps: u32,
}

impl FuzzParameters {
    /// Creates fuzz parameters.
    #[must_use]
    pub const fn new(deletions: u32, swaps: u32) -> Self {
        Self { deletions, swaps }
    }

    /// The `<deletions>-<swaps>` part of derived file names.
    #[must_use]
    pub fn suffix(&self) -> String {
        format!("{}-{}", self.deletions, self.swaps)
    }
}

impl fmt::Display for FuzzParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.deletions, self.swaps)
    }
}

/// A named corpus variant whose statistics are joined together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Group {
    /// Networks projected straight from the corpus.
    Plain,
    /// Networks mutated by the fuzzer.
    Fuzzed(FuzzParameters),
    /// Networks unfolded and shifted.
    Unrolled,
}

impl Group {
    /// Returns the tag used in file names (empty for the plain group).
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::Plain => String::new(),
            Self::Fuzzed(params) => format!("{FUZZED_TAG}-{params}"),
            Self::Unrolled => UNROLLED_TAG.to_string(),
        }
    }

    /// Returns the tag followed by a dash, or nothing for the plain group.
    #[must_use]
    pub fn dashed_tag(&self) -> String {
        match self {
            Self::Plain => String::new(),
            other => format!("{}-", other.tag()),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "plain" => Ok(Self::Plain),
            UNROLLED_TAG => Ok(Self::Unrolled),
            other => {
                let params = other
                    .strip_prefix(FUZZED_TAG)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .ok_or_else(|| format!("Unknown group: {other}"))?;
                let (deletions, swaps) = params
                    .split_once('-')
                    .ok_or_else(|| format!("Malformed fuzz group: {other}"))?;
                let deletions = deletions
                    .parse()
                    .map_err(|_| format!("Malformed fuzz group: {other}"))?;
                let swaps = swaps
                    .parse()
                    .map_err(|_| format!("Malformed fuzz group: {other}"))?;
                Ok(Self::Fuzzed(FuzzParameters::new(deletions, swaps)))
            }
        }
    }
}

impl TryFrom<String> for Group {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Group> for String {
    fn from(group: Group) -> Self {
        group.tag()
    }
}
