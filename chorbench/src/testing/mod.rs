//! Testing utilities for chorbench pipelines.
//!
//! This module provides:
//! - [`FakeAnalyses`], a deterministic stand-in for the external analyzer
//! - Corpus text builders for seeding working directories

mod fakes;

pub use fakes::FakeAnalyses;

use std::fmt::Write as _;

/// Renders `(case, body)` pairs in the choreography corpus grammar.
#[must_use]
pub fn corpus_text(cases: &[(&str, &str)]) -> String {
    let mut text = String::new();
    for (case, body) in cases {
        let _ = write!(text, "*** {case} ***\n{body}\n\n");
    }
    text
}
