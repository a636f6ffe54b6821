//! Pipeline execution.
//!
//! This module provides:
//! - The [`Pipeline`] orchestrator running stages over a working directory
//! - Checkpoint records deciding which artifacts are up to date
//! - Bounded retry for stochastic generation
//! - Soundness verification of extracted choreographies

mod checkpoint;
mod orchestrator;
mod retry;
mod soundness;

pub use checkpoint::{
    fingerprint, CheckpointDecision, CheckpointMode, CheckpointRecord, CheckpointStatus,
    CheckpointStore, CHECKPOINT_DIR,
};
pub use orchestrator::{Pipeline, RunSummary, StageReport};
pub use retry::{
    fuzz_until_valid, generate_with_retry, BackoffStrategy, FuzzResult, JitterStrategy, RetryConfig,
};
pub use soundness::{verify_soundness, SoundnessReport};
