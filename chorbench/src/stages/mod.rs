//! Stage trait and implementations.
//!
//! A stage turns one input file into one artifact file and one statistics
//! file. Which inputs it reads, how its outputs are named and what it does per
//! case is up to the stage; listing, checkpointing and writing are done by the
//! pipeline.

mod extraction;
mod fuzzing;
mod projection;
mod unrolling;

pub use extraction::ExtractionStage;
pub use fuzzing::FuzzStage;
pub use projection::ProjectionStage;
pub use unrolling::UnrollStage;

use std::fmt::Debug;

use crate::analyses::Analyses;
use crate::codec::Table;
use crate::config::PipelineConfig;
use crate::core::{CaseId, FileId};
use crate::errors::BenchError;
use crate::events::{EventSink, PipelineEvent};
use crate::store::{CorpusStore, NamingScheme, StoredFile};

/// Everything a stage may use while executing.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    /// The working directory.
    pub store: &'a CorpusStore,
    /// The external analyses.
    pub analyses: &'a dyn Analyses,
    /// Where progress goes.
    pub events: &'a dyn EventSink,
    /// The run configuration.
    pub config: &'a PipelineConfig,
}

impl StageContext<'_> {
    /// Returns the naming scheme.
    #[must_use]
    pub fn naming(&self) -> &NamingScheme {
        self.store.naming()
    }

    /// Reports that `case` of `input` is about to be processed.
    pub fn case_started(&self, stage: &str, input: &StoredFile, case: &CaseId) {
        self.events.emit(&PipelineEvent::CaseStarted {
            stage: stage.to_string(),
            input: input.name.clone(),
            case: case.clone(),
        });
    }
}

/// The two tables a stage produces for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    /// Artifact table (networks or choreographies).
    pub artifact: Table,
    /// Statistics table.
    pub statistics: Table,
}

impl StageOutput {
    /// Number of cases processed.
    #[must_use]
    pub fn cases(&self) -> usize {
        self.artifact.len()
    }
}

/// One pipeline stage.
pub trait Stage: Debug {
    /// Stage key, used in events and input fingerprints.
    fn name(&self) -> String;

    /// Prefix of the files this stage reads.
    fn input_prefix(&self, naming: &NamingScheme) -> String;

    /// Returns true if the stage processes input file `file`.
    fn accepts(&self, _file: &FileId) -> bool {
        true
    }

    /// Name of the artifact written for `file`.
    fn artifact_name(&self, naming: &NamingScheme, file: &FileId) -> String;

    /// Name of the statistics file written for `file`.
    fn statistics_name(&self, naming: &NamingScheme, file: &FileId) -> String;

    /// Processes every case of `input`.
    fn execute(
        &self,
        ctx: &StageContext<'_>,
        input: &StoredFile,
    ) -> Result<StageOutput, BenchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct EchoStage;

    impl Stage for EchoStage {
        fn name(&self) -> String {
            "echo".to_string()
        }

        fn input_prefix(&self, naming: &NamingScheme) -> String {
            naming.choreography.clone()
        }

        fn artifact_name(&self, _naming: &NamingScheme, file: &FileId) -> String {
            format!("echo-{file}")
        }

        fn statistics_name(&self, _naming: &NamingScheme, file: &FileId) -> String {
            format!("stats-echo-{file}")
        }

        fn execute(
            &self,
            _ctx: &StageContext<'_>,
            _input: &StoredFile,
        ) -> Result<StageOutput, BenchError> {
            Ok(StageOutput {
                artifact: Table::new(["testId", "network"]),
                statistics: Table::new(["testId"]),
            })
        }
    }

    #[test]
    fn test_default_accepts_everything() {
        let stage = EchoStage;
        let naming = NamingScheme::default();
        assert!(stage.accepts(&FileId::new("fuzzed-0-1-1-1-0-0")));
        assert_eq!(stage.input_prefix(&naming), "choreography-");
        assert_eq!(stage.artifact_name(&naming, &FileId::new("1")), "echo-1");
    }
}
