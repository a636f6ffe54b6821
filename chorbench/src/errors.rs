//! Error types for the chorbench pipeline.
//!
//! Struct errors carry the location of the failure (file, line) so that a
//! run aborted by a malformed input can be fixed without re-reading the
//! whole working directory. [`BenchError`] is the single error every
//! pipeline operation returns.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::{CaseId, Strategy};

/// The main error type for chorbench operations.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A tabular record could not be decoded.
    #[error("{0}")]
    MalformedRecord(#[from] MalformedRecordError),

    /// A choreography corpus file violated the corpus grammar.
    #[error("{0}")]
    MalformedCorpus(#[from] MalformedCorpusError),

    /// The pivot stage found a case missing from one strategy.
    #[error("{0}")]
    MissingJoinKey(#[from] MissingJoinKeyError),

    /// The working directory is missing or is not a directory.
    #[error("The directory {} does not exist or is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The working directory path is taken by something that is not a directory.
    #[error("{} already exists and is not a directory", path.display())]
    OutputPathConflict {
        /// The offending path.
        path: PathBuf,
    },

    /// An artifact needed by a later stage has not been produced.
    #[error("Missing artifact: {name}")]
    MissingArtifact {
        /// File name of the artifact inside the working directory.
        name: String,
    },

    /// The bounded generator gave up.
    #[error("Generation for {case} exhausted after {attempts} attempts")]
    GenerationExhausted {
        /// The case being generated.
        case: String,
        /// Number of attempts made.
        attempts: usize,
    },

    /// No strategy is available to key the pivot rows.
    #[error("No reference strategy available for the pivot (configured: {configured})")]
    MissingReferenceStrategy {
        /// The configured reference strategy.
        configured: Strategy,
    },

    /// An external analysis failed.
    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// A file selection pattern did not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The configuration is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Creates a missing artifact error.
    #[must_use]
    pub fn missing_artifact(name: impl Into<String>) -> Self {
        Self::MissingArtifact { name: name.into() }
    }
}

/// Error raised when a delimited record cannot be decoded.
#[derive(Debug, Clone, Error)]
#[error("Malformed record in {file} at line {line_number}: {reason} (line: {line:?})")]
pub struct MalformedRecordError {
    /// File (or stream) the record came from.
    pub file: String,
    /// 1-based line number.
    pub line_number: usize,
    /// The raw line.
    pub line: String,
    /// What was wrong with it.
    pub reason: String,
}

impl MalformedRecordError {
    /// Creates a new malformed record error.
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        line_number: usize,
        line: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line_number,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when a corpus file does not follow the corpus grammar.
#[derive(Debug, Clone, Error)]
#[error("line {line:?} was unexpected in {file} (line {line_number}): {reason}")]
pub struct MalformedCorpusError {
    /// The corpus file.
    pub file: String,
    /// 1-based line number.
    pub line_number: usize,
    /// The offending line.
    pub line: String,
    /// What was wrong with it.
    pub reason: String,
}

impl MalformedCorpusError {
    /// Creates a new malformed corpus error.
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        line_number: usize,
        line: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line_number,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when a pivot row key is absent from one strategy's table.
#[derive(Debug, Clone, Error)]
#[error("Case {case} of reference strategy {reference} is missing for strategy {strategy}")]
pub struct MissingJoinKeyError {
    /// The case that could not be joined.
    pub case: CaseId,
    /// The strategy lacking the case.
    pub strategy: Strategy,
    /// The strategy the rows were keyed from.
    pub reference: Strategy,
}

impl MissingJoinKeyError {
    /// Creates a new missing join key error.
    #[must_use]
    pub fn new(case: CaseId, strategy: Strategy, reference: Strategy) -> Self {
        Self {
            case,
            strategy,
            reference,
        }
    }
}

/// Failures reported by the external analyses.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The requested mutation is infeasible for this network. Retrying may succeed.
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    /// The analysis ran and failed.
    #[error("{analysis} failed: {reason}")]
    Failed {
        /// Which analysis.
        analysis: String,
        /// The reason given.
        reason: String,
    },

    /// The analysis answered with something that could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The analysis could not be invoked.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Creates a failed analysis error.
    #[must_use]
    pub fn failed(analysis: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            analysis: analysis.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the failure may go away on a retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidMutation(_))
    }
}
