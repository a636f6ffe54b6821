//! Pipeline configuration.
//!
//! Everything a run needs to know (where the working directory is, how files
//! are named, which strategies and mutation parameters to benchmark) is held
//! in one [`PipelineConfig`] value handed to the pipeline at construction.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyses::CommandConfig;
use crate::core::{FuzzParameters, Group, Strategy};
use crate::errors::BenchError;
use crate::pipeline::{CheckpointMode, RetryConfig};
use crate::stats::full_match;
use crate::store::NamingScheme;

/// A named selection of corpus files, by file id pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSet {
    /// Name used in combined statistics file names.
    pub name: String,
    /// Regular expression that must match a whole file id.
    pub pattern: String,
}

impl TestSet {
    /// Creates a test set.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// The benchmark test sets.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("comms-only", r"(\d+)-6-0-0"),
            Self::new("increasing-ifs-no-recursion", r"50-6-(\d+)-0"),
            Self::new("increasing-ifs-procedures", r"200-5-(\d+)-(\d+)"),
            Self::new("increasing-processes", r"500-(\d+)-0-0"),
            Self::new("increasing-ifs-with-recursion", r"100-10-(\d+)-5"),
            Self::new("increasing-procedures-no-ifs", r"1000-5-0-(\d+)"),
            Self::new("increasing-procedures-fixed-ifs", r"200-10-20-(\d+)"),
            Self::new("all", r"\d.*"),
        ]
    }
}

/// Parameters of the unroll-and-shift stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrollConfig {
    /// Probability of unfolding a procedure call.
    pub unfold_probability: f64,
    /// Unfolding iterations.
    pub iterations: u32,
    /// Probability of shifting a statement.
    pub shift_probability: f64,
    /// Projection file ids eligible for unrolling.
    pub file_pattern: String,
}

impl Default for UnrollConfig {
    fn default() -> Self {
        Self {
            unfold_probability: 0.2,
            iterations: 0,
            shift_probability: 0.6,
            file_pattern: r"\d+-\d+-\d+-[1-9]+".to_string(),
        }
    }
}

/// Configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding every corpus, artifact and statistics file.
    pub working_dir: PathBuf,
    /// File naming scheme.
    pub naming: NamingScheme,
    /// Strategies to benchmark.
    pub strategies: Vec<Strategy>,
    /// Fuzzing intensities.
    pub fuzz_parameters: Vec<FuzzParameters>,
    /// Unroll-and-shift parameters.
    pub unroll: UnrollConfig,
    /// Bound on fuzz generation attempts.
    pub generation: RetryConfig,
    /// How stage outputs are judged up to date.
    pub checkpoint: CheckpointMode,
    /// Groups whose statistics are combined.
    pub groups: Vec<Group>,
    /// Test sets whose statistics are combined.
    pub test_sets: Vec<TestSet>,
    /// Strategy whose cases key the pivot rows.
    pub reference_strategy: Strategy,
    /// External analyzer.
    pub analyzer: Option<CommandConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let fuzz_parameters = vec![
            FuzzParameters::new(0, 1),
            FuzzParameters::new(1, 0),
            FuzzParameters::new(2, 2),
        ];
        let mut groups = vec![Group::Plain];
        groups.extend(fuzz_parameters.iter().copied().map(Group::Fuzzed));
        groups.push(Group::Unrolled);

        Self {
            working_dir: PathBuf::from("tests"),
            naming: NamingScheme::default(),
            strategies: Strategy::benchmarked(),
            fuzz_parameters,
            unroll: UnrollConfig::default(),
            generation: RetryConfig::default(),
            checkpoint: CheckpointMode::default(),
            groups,
            test_sets: TestSet::defaults(),
            reference_strategy: Strategy::Random,
            analyzer: None,
        }
    }
}

impl PipelineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys take their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for contradictions.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.strategies.contains(&Strategy::Default) {
            return Err(BenchError::Config(
                "the Default strategy cannot be benchmarked".to_string(),
            ));
        }
        if self.generation.max_attempts == 0 {
            return Err(BenchError::Config(
                "generation.max_attempts must be at least 1".to_string(),
            ));
        }
        for probability in [self.unroll.unfold_probability, self.unroll.shift_probability] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(BenchError::Config(format!(
                    "probability {probability} is outside [0, 1]"
                )));
            }
        }
        full_match(&self.unroll.file_pattern)?;
        for set in &self.test_sets {
            full_match(&set.pattern)?;
        }
        Ok(())
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Sets the strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the fuzz parameters.
    #[must_use]
    pub fn with_fuzz_parameters(mut self, parameters: Vec<FuzzParameters>) -> Self {
        self.fuzz_parameters = parameters;
        self
    }

    /// Sets the generation bound.
    #[must_use]
    pub fn with_generation(mut self, generation: RetryConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Sets the checkpoint mode.
    #[must_use]
    pub fn with_checkpoint(mut self, mode: CheckpointMode) -> Self {
        self.checkpoint = mode;
        self
    }

    /// Sets the groups.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    /// Sets the test sets.
    #[must_use]
    pub fn with_test_sets(mut self, test_sets: Vec<TestSet>) -> Self {
        self.test_sets = test_sets;
        self
    }

    /// Sets the pivot reference strategy.
    #[must_use]
    pub fn with_reference_strategy(mut self, strategy: Strategy) -> Self {
        self.reference_strategy = strategy;
        self
    }

    /// Sets the external analyzer.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: CommandConfig) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Finds a test set by name.
    #[must_use]
    pub fn test_set(&self, name: &str) -> Option<&TestSet> {
        self.test_sets.iter().find(|t| t.name == name)
    }
}
