//! Port to the external analyses.
//!
//! The pipeline never looks inside a choreography or a network: it hands
//! their serialized text to an [`Analyses`] implementation and records what
//! comes back. Projection, extraction, equivalence checking, mutation and
//! the metric computations all live behind this trait.

mod command;

pub use command::{CommandAnalyses, CommandConfig};

use serde::{Deserialize, Serialize};

use crate::core::{Strategy, Verdict};
use crate::errors::AnalysisError;

/// Metrics of a source choreography.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreographyStatistics {
    /// Number of actions.
    pub number_of_actions: u64,
    /// Number of processes.
    pub number_of_processes: u64,
    /// Number of procedures.
    pub number_of_procedures: u64,
    /// Number of conditionals.
    pub number_of_conditionals: u64,
}

/// Per-process metrics of a network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatistics {
    /// Shortest process length.
    pub min_length_of_processes: u64,
    /// Longest process length.
    pub max_length_of_processes: u64,
    /// Average process length.
    pub avg_length_of_processes: f64,
    /// Fewest procedures in a process.
    pub min_number_of_procedures_in_processes: u64,
    /// Most procedures in a process.
    pub max_number_of_procedures_in_processes: u64,
    /// Average procedures per process.
    pub avg_number_of_procedures_in_processes: f64,
    /// Fewest conditionals in a process.
    pub min_number_of_conditionals_in_processes: u64,
    /// Most conditionals in a process.
    pub max_number_of_conditionals_in_processes: u64,
    /// Average conditionals per process.
    pub avg_number_of_conditionals_in_processes: f64,
    /// Processes containing at least one conditional.
    pub number_of_processes_with_conditionals: u64,
    /// Shortest procedure.
    pub min_procedure_length_in_processes: u64,
    /// Longest procedure.
    pub max_procedure_length_in_processes: u64,
    /// Average procedure length.
    pub avg_procedure_length_in_processes: f64,
}

/// Size of the graph explored by an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    /// Nodes created.
    pub nodes: u64,
    /// Bad loops met.
    pub bad_loops: u64,
}

/// Metrics of an extracted program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStatistics {
    /// Actions in the main bodies.
    pub number_of_actions: u64,
    /// Procedures defined.
    pub number_of_procedures: u64,
    /// Length of every procedure.
    pub procedure_lengths: Vec<u64>,
}

/// What an extraction produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "choreography")]
pub enum ExtractionOutcome {
    /// A choreography was reconstructed.
    Extracted(String),
    /// The network could not be turned into a choreography.
    Unextractable,
}

impl ExtractionOutcome {
    /// Returns the choreography text, empty when unextractable.
    #[must_use]
    pub fn choreography(&self) -> &str {
        match self {
            Self::Extracted(choreography) => choreography,
            Self::Unextractable => "",
        }
    }
}

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// The reconstructed choreography, if any.
    pub outcome: ExtractionOutcome,
    /// Graph exploration counters.
    pub graph: GraphStatistics,
}

/// The external analyses driven by the pipeline.
#[cfg_attr(test, mockall::automock)]
pub trait Analyses {
    /// Projects a choreography into a network.
    fn project(&self, choreography: &str) -> Result<String, AnalysisError>;

    /// Extracts a choreography from a network.
    fn extract(&self, network: &str, strategy: Strategy) -> Result<Extraction, AnalysisError>;

    /// Compares the behaviour of two choreographies.
    fn bisimilar(&self, original: &str, extracted: &str) -> Result<Verdict, AnalysisError>;

    /// Randomly mutates a network. Fails with
    /// [`AnalysisError::InvalidMutation`] when the requested intensity does
    /// not fit the network.
    fn fuzz(&self, network: &str, deletions: u32, swaps: u32) -> Result<String, AnalysisError>;

    /// Unfolds procedure calls.
    fn unfold(
        &self,
        network: &str,
        probability: f64,
        iterations: u32,
    ) -> Result<String, AnalysisError>;

    /// Reorders independent statements.
    fn shift(&self, network: &str, probability: f64) -> Result<String, AnalysisError>;

    /// Metrics of a source choreography.
    fn choreography_statistics(
        &self,
        choreography: &str,
    ) -> Result<ChoreographyStatistics, AnalysisError>;

    /// Metrics of a network.
    fn network_statistics(&self, network: &str) -> Result<NetworkStatistics, AnalysisError>;

    /// Metrics of an extracted choreography.
    fn program_statistics(&self, choreography: &str) -> Result<ProgramStatistics, AnalysisError>;
}
