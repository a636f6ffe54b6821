//! Fuzzing stage: random deletions and swaps applied to projected networks.

use tracing::debug;

use crate::core::{FileId, FuzzParameters};
use crate::errors::BenchError;
use crate::pipeline::fuzz_until_valid;
use crate::stats::statistics_table;
use crate::store::{network_table, CaseMap, NamingScheme, StoredFile};

use super::{Stage, StageContext, StageOutput};

/// Mutates every network of a plain `projection-<id>` file with one
/// deletion/swap intensity.
#[derive(Debug, Clone, Copy)]
pub struct FuzzStage {
    params: FuzzParameters,
}

impl FuzzStage {
    /// Creates the stage for `params`.
    #[must_use]
    pub fn new(params: FuzzParameters) -> Self {
        Self { params }
    }

    /// Returns the mutation parameters.
    #[must_use]
    pub fn params(&self) -> FuzzParameters {
        self.params
    }
}

impl Stage for FuzzStage {
    fn name(&self) -> String {
        format!("fuzzing:{}", self.params.suffix())
    }

    fn input_prefix(&self, naming: &NamingScheme) -> String {
        naming.projection.clone()
    }

    fn accepts(&self, file: &FileId) -> bool {
        !file.is_derived()
    }

    fn artifact_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.fuzzed_file(self.params, file)
    }

    fn statistics_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.fuzz_statistics_file(self.params, file)
    }

    fn execute(
        &self,
        ctx: &StageContext<'_>,
        input: &StoredFile,
    ) -> Result<StageOutput, BenchError> {
        let stage = self.name();
        let networks = ctx.store.read_networks(&input.name)?;

        let mut fuzzed = CaseMap::new();
        let mut statistics = Vec::with_capacity(networks.len());
        for (case, network) in &networks {
            ctx.case_started(&stage, input, case);
            let result = fuzz_until_valid(
                ctx.analyses,
                &ctx.config.generation,
                ctx.events,
                case.as_str(),
                network,
                self.params,
            )?;
            debug!(
                "{stage} {case}: {} attempt(s), {:.2} ms",
                result.attempts, result.elapsed_ms
            );
            statistics.push((case, ctx.analyses.network_statistics(&result.network)?));
            fuzzed.insert(case.clone(), result.network);
        }

        Ok(StageOutput {
            artifact: network_table(&fuzzed)?,
            statistics: statistics_table(statistics.iter().map(|(case, stats)| (*case, stats)))?,
        })
    }
}
