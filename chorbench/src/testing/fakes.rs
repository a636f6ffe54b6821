//! Deterministic in-process analyses.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::analyses::{
    Analyses, ChoreographyStatistics, Extraction, ExtractionOutcome, GraphStatistics,
    NetworkStatistics, ProgramStatistics,
};
use crate::core::{Strategy, Verdict};
use crate::errors::AnalysisError;

const NETWORK_OPEN: &str = "net[";
const NETWORK_CLOSE: &str = "]";

fn count(text: &str, pattern: &str) -> u64 {
    text.matches(pattern).count() as u64
}

fn words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// An [`Analyses`] implementation whose answers follow from the text it is
/// given.
///
/// - projection wraps a choreography as `net[<choreography>]`
/// - extraction unwraps it again; any other network extracts to itself
/// - bisimulation compares the two texts
/// - fuzzing appends `~<d>-<s>` after the configured number of refusals
/// - unfolding and shifting wrap the network in `unfold(..)` and `shift(..)`
/// - statistics count words, arrows, `def`s and `if`s
///
/// Every call is counted per operation.
#[derive(Debug, Default)]
pub struct FakeAnalyses {
    unextractable: HashSet<Strategy>,
    inconclusive: HashSet<String>,
    fuzz_refusals: usize,
    mutations: AtomicUsize,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeAnalyses {
    /// Creates a fake that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every extraction with `strategy` fail to produce a choreography.
    #[must_use]
    pub fn with_unextractable(mut self, strategy: Strategy) -> Self {
        self.unextractable.insert(strategy);
        self
    }

    /// Makes bisimulation inconclusive for this original choreography.
    #[must_use]
    pub fn with_inconclusive(mut self, choreography: impl Into<String>) -> Self {
        self.inconclusive.insert(choreography.into());
        self
    }

    /// Makes the first `refusals` mutating fuzz calls fail recoverably.
    #[must_use]
    pub fn with_fuzz_refusals(mut self, refusals: usize) -> Self {
        self.fuzz_refusals = refusals;
        self
    }

    /// Returns how many times `operation` was called.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Returns the number of calls across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Forgets every counted call.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, operation: &'static str) {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }
}

impl Analyses for FakeAnalyses {
    fn project(&self, choreography: &str) -> Result<String, AnalysisError> {
        self.record("project");
        Ok(format!("{NETWORK_OPEN}{choreography}{NETWORK_CLOSE}"))
    }

    fn extract(&self, network: &str, strategy: Strategy) -> Result<Extraction, AnalysisError> {
        self.record("extract");
        let graph = GraphStatistics {
            nodes: words(network),
            bad_loops: 0,
        };
        if self.unextractable.contains(&strategy) {
            return Ok(Extraction {
                outcome: ExtractionOutcome::Unextractable,
                graph,
            });
        }
        let choreography = network
            .strip_prefix(NETWORK_OPEN)
            .and_then(|rest| rest.strip_suffix(NETWORK_CLOSE))
            .unwrap_or(network);
        Ok(Extraction {
            outcome: ExtractionOutcome::Extracted(choreography.to_string()),
            graph,
        })
    }

    fn bisimilar(&self, original: &str, extracted: &str) -> Result<Verdict, AnalysisError> {
        self.record("bisimilar");
        let verdict = if self.inconclusive.contains(original) {
            Verdict::Maybe
        } else if original == extracted {
            Verdict::Ok
        } else {
            Verdict::Fail
        };
        Ok(verdict)
    }

    fn fuzz(&self, network: &str, deletions: u32, swaps: u32) -> Result<String, AnalysisError> {
        self.record("fuzz");
        if deletions == 0 && swaps == 0 {
            return Ok(network.to_string());
        }
        if self.mutations.fetch_add(1, Ordering::SeqCst) < self.fuzz_refusals {
            return Err(AnalysisError::InvalidMutation(format!(
                "cannot apply {deletions} deletions and {swaps} swaps"
            )));
        }
        Ok(format!("{network}~{deletions}-{swaps}"))
    }

    fn unfold(
        &self,
        network: &str,
        _probability: f64,
        _iterations: u32,
    ) -> Result<String, AnalysisError> {
        self.record("unfold");
        Ok(format!("unfold({network})"))
    }

    fn shift(&self, network: &str, _probability: f64) -> Result<String, AnalysisError> {
        self.record("shift");
        Ok(format!("shift({network})"))
    }

    fn choreography_statistics(
        &self,
        choreography: &str,
    ) -> Result<ChoreographyStatistics, AnalysisError> {
        self.record("choreography_statistics");
        let processes: BTreeSet<&str> = choreography
            .split_whitespace()
            .filter_map(|word| word.split_once('.').map(|(process, _)| process))
            .collect();
        Ok(ChoreographyStatistics {
            number_of_actions: count(choreography, "->"),
            number_of_processes: processes.len() as u64,
            number_of_procedures: count(choreography, "def "),
            number_of_conditionals: count(choreography, "if "),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn network_statistics(&self, network: &str) -> Result<NetworkStatistics, AnalysisError> {
        self.record("network_statistics");
        let length = words(network);
        let procedures = count(network, "def ");
        let conditionals = count(network, "if ");
        Ok(NetworkStatistics {
            min_length_of_processes: length,
            max_length_of_processes: length,
            avg_length_of_processes: length as f64,
            min_number_of_procedures_in_processes: procedures,
            max_number_of_procedures_in_processes: procedures,
            avg_number_of_procedures_in_processes: procedures as f64,
            min_number_of_conditionals_in_processes: conditionals,
            max_number_of_conditionals_in_processes: conditionals,
            avg_number_of_conditionals_in_processes: conditionals as f64,
            number_of_processes_with_conditionals: u64::from(conditionals > 0),
            ..NetworkStatistics::default()
        })
    }

    fn program_statistics(&self, choreography: &str) -> Result<ProgramStatistics, AnalysisError> {
        self.record("program_statistics");
        let procedure_lengths: Vec<u64> = choreography
            .split("def ")
            .skip(1)
            .map(|procedure| words(procedure.split("main").next().unwrap_or_default()))
            .collect();
        Ok(ProgramStatistics {
            number_of_actions: count(choreography, "->"),
            number_of_procedures: procedure_lengths.len() as u64,
            procedure_lengths,
        })
    }
}
