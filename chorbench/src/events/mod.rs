//! Progress and diagnostic events.
//!
//! Stages never print. They describe what they are doing as
//! [`PipelineEvent`]s and hand them to an [`EventSink`]; the binary renders
//! them through `tracing`, tests collect them.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde::Serialize;

use crate::core::{CaseId, Strategy, Verdict, VerdictTally};

/// Something worth reporting while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A stage started on an input file.
    StageStarted {
        /// Stage name.
        stage: String,
        /// Input file name.
        input: String,
    },
    /// A stage output was already up to date.
    StageSkipped {
        /// Stage name.
        stage: String,
        /// Output artifact name.
        artifact: String,
    },
    /// A stage wrote its artifact and statistics.
    StageCompleted {
        /// Stage name.
        stage: String,
        /// Output artifact name.
        artifact: String,
        /// Number of cases processed.
        cases: usize,
        /// Wall-clock time in milliseconds.
        elapsed_ms: f64,
    },
    /// A case is about to be handed to an analysis.
    CaseStarted {
        /// Stage name.
        stage: String,
        /// Input file name.
        input: String,
        /// The case.
        case: CaseId,
    },
    /// An extraction strategy produced no choreography.
    Unextractable {
        /// Input file name.
        input: String,
        /// The case.
        case: CaseId,
        /// The strategy.
        strategy: Strategy,
    },
    /// The generator refused a mutation and is retrying.
    GenerationRetry {
        /// The case.
        case: String,
        /// Failed attempt number.
        attempt: usize,
        /// Why it failed.
        reason: String,
    },
    /// A soundness verdict was counted.
    VerdictRecorded {
        /// Corpus file id.
        file: String,
        /// The case.
        case: CaseId,
        /// The strategy.
        strategy: Strategy,
        /// The verdict.
        verdict: Verdict,
    },
    /// An extraction needed for soundness checking has not been produced.
    ExtractionMissing {
        /// Corpus file id.
        file: String,
        /// The case, absent when the whole artifact is missing.
        case: Option<CaseId>,
        /// The strategy.
        strategy: Strategy,
    },
    /// Final soundness totals.
    SoundnessTotals {
        /// The tally.
        tally: VerdictTally,
        /// Pairs skipped for lack of an extraction.
        skipped: usize,
    },
}

impl PipelineEvent {
    /// Dotted event type, e.g. `stage.started`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StageStarted { .. } => "stage.started",
            Self::StageSkipped { .. } => "stage.skipped",
            Self::StageCompleted { .. } => "stage.completed",
            Self::CaseStarted { .. } => "case.started",
            Self::Unextractable { .. } => "case.unextractable",
            Self::GenerationRetry { .. } => "generation.retry",
            Self::VerdictRecorded { .. } => "soundness.verdict",
            Self::ExtractionMissing { .. } => "soundness.missing",
            Self::SoundnessTotals { .. } => "soundness.totals",
        }
    }

    /// Returns true for events that signal something a user should look at.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::Unextractable { .. }
                | Self::GenerationRetry { .. }
                | Self::ExtractionMissing { .. }
        )
    }
}
