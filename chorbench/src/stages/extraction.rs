//! Extraction stage: networks back to choreographies, one strategy at a time.

use crate::analyses::ExtractionOutcome;
use crate::core::{FileId, Strategy};
use crate::errors::BenchError;
use crate::events::PipelineEvent;
use crate::observability::SpanTimer;
use crate::stats::{statistics_table, ExtractionStatistics};
use crate::store::{extraction_table, NamingScheme, StoredFile};

use super::{Stage, StageContext, StageOutput};

/// Extracts every network of a `projection-<id>` file (derived networks
/// included) with one strategy.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionStage {
    strategy: Strategy,
}

impl ExtractionStage {
    /// Creates the stage for `strategy`.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Returns the strategy.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl Stage for ExtractionStage {
    fn name(&self) -> String {
        format!("extraction:{}", self.strategy)
    }

    fn input_prefix(&self, naming: &NamingScheme) -> String {
        naming.projection.clone()
    }

    fn artifact_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.extraction_file(self.strategy, file)
    }

    fn statistics_name(&self, naming: &NamingScheme, file: &FileId) -> String {
        naming.extraction_statistics_file(self.strategy, file)
    }

    fn execute(
        &self,
        ctx: &StageContext<'_>,
        input: &StoredFile,
    ) -> Result<StageOutput, BenchError> {
        let stage = self.name();
        let networks = ctx.store.read_networks(&input.name)?;

        let mut choreographies = Vec::with_capacity(networks.len());
        let mut statistics = Vec::with_capacity(networks.len());
        for (case, network) in &networks {
            ctx.case_started(&stage, input, case);

            let timer = SpanTimer::start(format!("{stage} {case}"));
            let extraction = ctx.analyses.extract(network, self.strategy)?;
            let time_ms = timer.elapsed_whole_ms();

            if extraction.outcome == ExtractionOutcome::Unextractable {
                ctx.events.emit(&PipelineEvent::Unextractable {
                    input: input.name.clone(),
                    case: case.clone(),
                    strategy: self.strategy,
                });
            }

            let record = ExtractionStatistics::from_extraction(
                self.strategy,
                time_ms,
                &extraction,
                |choreography| ctx.analyses.program_statistics(choreography),
            )?;
            choreographies.push((case, extraction.outcome));
            statistics.push((case, record));
        }

        let artifact = extraction_table(
            self.strategy,
            choreographies
                .iter()
                .map(|(case, outcome)| (*case, outcome.choreography())),
        )?;
        Ok(StageOutput {
            artifact,
            statistics: statistics_table(statistics.iter().map(|(case, record)| (*case, record)))?,
        })
    }
}
