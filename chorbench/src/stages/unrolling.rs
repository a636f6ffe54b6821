//! Unroll-and-shift stage.

use regex::Regex;

use crate::config::UnrollConfig;
use crate::core::FileId;
use crate::errors::BenchError;
use crate::stats::{full_match, statistics_table};
use crate::store::{network_table, CaseMap, NamingScheme, StoredFile};

use super::{Stage, StageContext, StageOutput};

/// Unfolds procedure calls and then shifts statements in every network of a
/// plain projection file whose id matches the configured pattern.
#[derive(Debug, Clone)]
pub struct UnrollStage {
    config: UnrollConfig,
    selection: Regex,
}

impl UnrollStage {
    /// Creates the stage, compiling the file pattern.
    pub fn new(config: &UnrollConfig) -> Result<Self, BenchError> {
        Ok(Self {
            selection: full_match(&config.file_pattern)?,
            config: config.clone(),
        })
    }
}

impl Stage for UnrollStage {
    fn name(&self) -> String {
        "unrolling".to_string()
    }

    fn input_prefix(&self, naming: &NamingScheme) -> String {
        naming.projection.clone()
    }

    fn accepts(&self, file: &FileId) -> bool {
        !file.is_derived() && self.selection.is_match(file.as_str())
    }

    fn artifact_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.unrolled_file(file)
    }

    fn statistics_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.unrolled_statistics_file(file)
    }

    fn execute(
        &self,
        ctx: &StageContext<'_>,
        input: &StoredFile,
    ) -> Result<StageOutput, BenchError> {
        let stage = self.name();
        let networks = ctx.store.read_networks(&input.name)?;

        let mut unrolled = CaseMap::new();
        let mut statistics = Vec::with_capacity(networks.len());
        for (case, network) in &networks {
            ctx.case_started(&stage, input, case);
            let unfolded = ctx
                .analyses
                .unfold(network, self.config.unfold_probability, self.config.iterations)?;
            let shifted = ctx.analyses.shift(&unfolded, self.config.shift_probability)?;
            statistics.push((case, ctx.analyses.network_statistics(&shifted)?));
            unrolled.insert(case.clone(), shifted);
        }

        Ok(StageOutput {
            artifact: network_table(&unrolled)?,
            statistics: statistics_table(statistics.iter().map(|(case, stats)| (*case, stats)))?,
        })
    }
}
