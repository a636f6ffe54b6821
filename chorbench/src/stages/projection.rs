//! Projection stage: choreography corpus files to networks.

use crate::core::FileId;
use crate::errors::BenchError;
use crate::stats::{statistics_table, ProjectionStatistics};
use crate::store::{network_table, CaseMap, NamingScheme, StoredFile};

use super::{Stage, StageContext, StageOutput};

/// Projects every case of a `choreography-<id>` file into
/// `projection-<id>` and `stats-projection-<id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionStage;

impl ProjectionStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Stage for ProjectionStage {
    fn name(&self) -> String {
        "projection".to_string()
    }

    fn input_prefix(&self, naming: &NamingScheme) -> String {
        naming.choreography.clone()
    }

    fn artifact_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.projection(file)
    }

    fn statistics_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.projection_statistics_file(file)
    }

    fn execute(
        &self,
        ctx: &StageContext<'_>,
        input: &StoredFile,
    ) -> Result<StageOutput, BenchError> {
        let stage = self.name();
        let choreographies = ctx.store.read_corpus(&input.name)?;

        let mut networks = CaseMap::new();
        let mut statistics = Vec::with_capacity(choreographies.len());
        for (case, choreography) in &choreographies {
            ctx.case_started(&stage, input, case);
            let network = ctx.analyses.project(choreography)?;
            statistics.push((
                case,
                ProjectionStatistics {
                    choreography: ctx.analyses.choreography_statistics(choreography)?,
                    network: ctx.analyses.network_statistics(&network)?,
                },
            ));
            networks.insert(case.clone(), network);
        }

        Ok(StageOutput {
            artifact: network_table(&networks)?,
            statistics: statistics_table(statistics.iter().map(|(case, stats)| (*case, stats)))?,
        })
    }
}
