//! Core domain types for chorbench.
//!
//! This module contains the typed identifiers the rest of the pipeline is
//! keyed on:
//! - Case and file identifiers
//! - Extraction strategies
//! - Corpus-variant groups and fuzz parameters
//! - Soundness verdicts and their tally

mod group;
mod ids;
mod strategy;
mod verdict;

pub use group::{FuzzParameters, Group};
pub use ids::{CaseId, FileId};
pub use strategy::{ParseStrategyError, Strategy};
pub use verdict::{Verdict, VerdictTally};
