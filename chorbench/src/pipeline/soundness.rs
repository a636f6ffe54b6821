//! Soundness verification: does extraction give back the projected
//! choreography?

use serde::Serialize;

use crate::analyses::Analyses;
use crate::core::{Strategy, Verdict, VerdictTally};
use crate::errors::BenchError;
use crate::events::{EventSink, PipelineEvent};
use crate::store::CorpusStore;

/// Outcome of a soundness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SoundnessReport {
    /// Verdicts of every checked `(case, strategy)` pair.
    pub tally: VerdictTally,
    /// Pairs without an extraction.
    pub skipped: usize,
}

impl SoundnessReport {
    /// Number of pairs looked at, checked or not.
    #[must_use]
    pub fn pairs(&self) -> usize {
        self.tally.total() + self.skipped
    }
}

/// Compares every corpus choreography with its extraction by each of
/// `strategies`.
///
/// An extraction that was never produced is reported and skipped, never
/// counted. An empty extraction (the strategy gave up) is a [`Verdict::Fail`]
/// without asking the checker.
pub fn verify_soundness(
    store: &CorpusStore,
    analyses: &dyn Analyses,
    events: &dyn EventSink,
    strategies: &[Strategy],
) -> Result<SoundnessReport, BenchError> {
    let naming = store.naming();
    let mut report = SoundnessReport::default();

    for corpus in store.list_files(&naming.choreography)? {
        let originals = store.read_corpus(&corpus.name)?;
        let file = corpus.id.to_string();

        for &strategy in strategies {
            let artifact = naming.extraction_file(strategy, &corpus.id);
            if !store.contains(&artifact) {
                events.emit(&PipelineEvent::ExtractionMissing {
                    file: file.clone(),
                    case: None,
                    strategy,
                });
                report.skipped += originals.len();
                continue;
            }

            let extractions = store.read_extractions(&artifact)?;
            for (case, original) in &originals {
                let Some(extracted) = extractions.get(case) else {
                    events.emit(&PipelineEvent::ExtractionMissing {
                        file: file.clone(),
                        case: Some(case.clone()),
                        strategy,
                    });
                    report.skipped += 1;
                    continue;
                };

                // An unextractable case has no choreography, and nothing empty is
                // bisimilar to a corpus case, so the checker is not consulted.
                let verdict = if extracted.is_empty() {
                    Verdict::Fail
                } else {
                    analyses.bisimilar(original, extracted)?
                };
                report.tally.record(verdict);
                events.emit(&PipelineEvent::VerdictRecorded {
                    file: file.clone(),
                    case: case.clone(),
                    strategy,
                    verdict,
                });
            }
        }
    }

    events.emit(&PipelineEvent::SoundnessTotals {
        tally: report.tally,
        skipped: report.skipped,
    });
    Ok(report)
}
