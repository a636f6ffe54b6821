//! # Chorbench
//!
//! A benchmark pipeline for choreography projection and extraction.
//!
//! Chorbench drives an external analyzer over a working directory of
//! choreography corpus files and records what it measures:
//!
//! - **Staged execution**: projection, extraction per strategy, fuzzing per
//!   mutation intensity and unroll-and-shift, each writing one artifact and
//!   one statistics file per input file
//! - **Checkpointing**: reruns skip artifacts whose input has not changed
//! - **Soundness checking**: extracted choreographies are compared with
//!   their sources and tallied as OK, MAYBE or FAIL
//! - **Statistics**: per-file tables are outer-joined, pivoted across
//!   strategies and accumulated per strategy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chorbench::prelude::*;
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::new().with_working_dir("tests");
//! let analyses = CommandAnalyses::new(CommandConfig::new("chor-analyzer"));
//! let pipeline = Pipeline::new(config, Box::new(analyses), Arc::new(LoggingEventSink::new()))?;
//!
//! pipeline.run_all()?;
//! let report = pipeline.verify_soundness()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod analyses;
pub mod codec;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod stats;
pub mod store;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analyses::{
        Analyses, CommandAnalyses, CommandConfig, Extraction, ExtractionOutcome,
    };
    pub use crate::codec::Table;
    pub use crate::config::{PipelineConfig, TestSet, UnrollConfig};
    pub use crate::core::{CaseId, FileId, FuzzParameters, Group, Strategy, Verdict, VerdictTally};
    pub use crate::errors::{AnalysisError, BenchError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, PipelineEvent,
    };
    pub use crate::pipeline::{CheckpointMode, Pipeline, RetryConfig, SoundnessReport, StageReport};
    pub use crate::stages::Stage;
    pub use crate::store::{CorpusStore, NamingScheme};
}
