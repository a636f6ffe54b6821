//! File naming convention.
//!
//! A file name is `<stage prefix><parameters and tags><source file id>`. The
//! scheme is a plain value so a run can use a different layout without
//! touching the stages.

use serde::{Deserialize, Serialize};

use crate::core::{FileId, FuzzParameters, Group, Strategy};

/// Stage prefixes for every file the pipeline reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingScheme {
    /// Choreography corpus files.
    pub choreography: String,
    /// Projected networks, and every network derived from them.
    pub projection: String,
    /// Fuzzed networks.
    pub fuzzed: String,
    /// Unrolled-and-shifted networks.
    pub unrolled: String,
    /// Extracted choreographies.
    pub extraction: String,
    /// Projection statistics.
    pub projection_statistics: String,
    /// Extraction statistics.
    pub extraction_statistics: String,
    /// Fuzzing statistics.
    pub fuzz_statistics: String,
    /// Unrolling statistics.
    pub unrolled_statistics: String,
    /// Combined, pivoted and accumulated statistics.
    pub combined_statistics: String,
    /// Extension of accumulated statistics files.
    pub accumulated_extension: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            choreography: "choreography-".to_string(),
            projection: "projection-".to_string(),
            fuzzed: "projection-fuzzed-".to_string(),
            unrolled: "projection-unrolled-".to_string(),
            extraction: "extraction-".to_string(),
            projection_statistics: "stats-projection-".to_string(),
            extraction_statistics: "stats-extraction-".to_string(),
            fuzz_statistics: "stats-fuzzing-".to_string(),
            unrolled_statistics: "stats-unrolled-".to_string(),
            combined_statistics: "stats-".to_string(),
            accumulated_extension: ".tsv".to_string(),
        }
    }
}

impl NamingScheme {
    /// `projection-<id>`
    #[must_use]
    pub fn projection(&self, file: &FileId) -> String {
        format!("{}{file}", self.projection)
    }

    /// `stats-projection-<id>`
    #[must_use]
    pub fn projection_statistics_file(&self, file: &FileId) -> String {
        format!("{}{file}", self.projection_statistics)
    }

    /// `extraction-<strategy>-`
    #[must_use]
    pub fn extraction_prefix(&self, strategy: Strategy) -> String {
        format!("{}{strategy}-", self.extraction)
    }

    /// `extraction-<strategy>-<id>`
    #[must_use]
    pub fn extraction_file(&self, strategy: Strategy, file: &FileId) -> String {
        format!("{}{file}", self.extraction_prefix(strategy))
    }

    /// `stats-extraction-<strategy>-`
    #[must_use]
    pub fn extraction_statistics_prefix(&self, strategy: Strategy) -> String {
        format!("{}{strategy}-", self.extraction_statistics)
    }

    /// `stats-extraction-<strategy>-<id>`
    #[must_use]
    pub fn extraction_statistics_file(&self, strategy: Strategy, file: &FileId) -> String {
        format!("{}{file}", self.extraction_statistics_prefix(strategy))
    }

    /// `projection-fuzzed-<d>-<s>-<id>`
    #[must_use]
    pub fn fuzzed_file(&self, params: FuzzParameters, file: &FileId) -> String {
        format!("{}{}-{file}", self.fuzzed, params.suffix())
    }

    /// `stats-fuzzing-<d>-<s>-`
    #[must_use]
    pub fn fuzz_statistics_prefix(&self, params: FuzzParameters) -> String {
        format!("{}{}-", self.fuzz_statistics, params.suffix())
    }

    /// `stats-fuzzing-<d>-<s>-<id>`
    #[must_use]
    pub fn fuzz_statistics_file(&self, params: FuzzParameters, file: &FileId) -> String {
        format!("{}{file}", self.fuzz_statistics_prefix(params))
    }

    /// `projection-unrolled-<id>`
    #[must_use]
    pub fn unrolled_file(&self, file: &FileId) -> String {
        format!("{}{file}", self.unrolled)
    }

    /// `stats-unrolled-<id>`
    #[must_use]
    pub fn unrolled_statistics_file(&self, file: &FileId) -> String {
        format!("{}{file}", self.unrolled_statistics)
    }

    /// Prefix of the statistics files describing the networks of a group.
    #[must_use]
    pub fn group_network_statistics_prefix(&self, group: Group) -> String {
        match group {
            Group::Plain => self.projection_statistics.clone(),
            Group::Fuzzed(params) => self.fuzz_statistics_prefix(params),
            Group::Unrolled => self.unrolled_statistics.clone(),
        }
    }

    /// Prefix of the extraction statistics files of a group.
    #[must_use]
    pub fn group_extraction_statistics_prefix(&self, strategy: Strategy, group: Group) -> String {
        format!("{}{}", self.extraction_statistics_prefix(strategy), group.dashed_tag())
    }

    /// `stats-<strategy>[-<group>]-<test set>`
    #[must_use]
    pub fn combined_file(&self, strategy: Strategy, group: Group, test_set: &str) -> String {
        format!(
            "{}{strategy}-{}{test_set}",
            self.combined_statistics,
            group.dashed_tag()
        )
    }

    /// `stats-[<group>-]<test set>`
    #[must_use]
    pub fn pivot_file(&self, group: Group, test_set: &str) -> String {
        format!("{}{}{test_set}", self.combined_statistics, group.dashed_tag())
    }

    /// `stats-<strategy>.tsv`
    #[must_use]
    pub fn accumulated_file(&self, strategy: Strategy) -> String {
        format!(
            "{}{strategy}{}",
            self.combined_statistics, self.accumulated_extension
        )
    }
}
