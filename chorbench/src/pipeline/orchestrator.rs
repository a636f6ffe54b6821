//! The pipeline: stages, soundness and statistics over one working directory.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analyses::Analyses;
use crate::codec::Table;
use crate::config::{PipelineConfig, TestSet};
use crate::core::{FuzzParameters, Group, Strategy};
use crate::errors::BenchError;
use crate::events::{EventSink, PipelineEvent};
use crate::observability::SpanTimer;
use crate::stages::{ExtractionStage, FuzzStage, ProjectionStage, Stage, StageContext, UnrollStage};
use crate::stats::{self, Aggregator};
use crate::store::CorpusStore;

use super::checkpoint::{fingerprint, CheckpointDecision, CheckpointRecord, CheckpointStore};
use super::soundness::{self, SoundnessReport};

/// What one stage did across its input files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Stage key.
    pub stage: String,
    /// Artifacts written by this run.
    pub written: Vec<String>,
    /// Artifacts found up to date.
    pub skipped: Vec<String>,
}

impl StageReport {
    fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    /// Number of input files the stage looked at.
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.written.len() + self.skipped.len()
    }
}

/// Summary of [`Pipeline::run_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Stage reports, in execution order.
    pub stages: Vec<StageReport>,
    /// Combined and pivoted statistics files written.
    pub statistics: Vec<String>,
}

/// Runs the benchmark stages over one working directory.
pub struct Pipeline {
    config: PipelineConfig,
    store: CorpusStore,
    checkpoints: CheckpointStore,
    analyses: Box<dyn Analyses>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("working_dir", &self.config.working_dir)
            .field("run_id", &self.checkpoints.run_id())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline. The configuration is validated; the working
    /// directory is not touched until a stage runs.
    pub fn new(
        config: PipelineConfig,
        analyses: Box<dyn Analyses>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, BenchError> {
        config.validate()?;
        let store = CorpusStore::new(config.working_dir.clone(), config.naming.clone());
        let checkpoints = CheckpointStore::new(&config.working_dir, config.checkpoint);
        debug!(
            run_id = %checkpoints.run_id(),
            working_dir = %config.working_dir.display(),
            "Pipeline created"
        );
        Ok(Self {
            config,
            store,
            checkpoints,
            analyses,
            events,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the working directory store.
    #[must_use]
    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    fn context(&self) -> StageContext<'_> {
        StageContext {
            store: &self.store,
            analyses: self.analyses.as_ref(),
            events: self.events.as_ref(),
            config: &self.config,
        }
    }

    fn emit(&self, event: &PipelineEvent) {
        self.events.emit(event);
    }

    /// Runs `stage` on every input file it accepts, skipping inputs whose
    /// artifact is up to date.
    ///
    /// The statistics file is written before the artifact, and the artifact
    /// before its checkpoint is completed, so a crash never leaves an
    /// artifact that looks finished without its statistics.
    pub fn run_stage(&self, stage: &dyn Stage) -> Result<StageReport, BenchError> {
        self.store.ensure_output_directory()?;
        let naming = self.store.naming();
        let name = stage.name();
        let ctx = self.context();
        let mut report = StageReport::new(&name);

        for input in self.store.list_files(&stage.input_prefix(naming))? {
            if !stage.accepts(&input.id) {
                continue;
            }
            let artifact = stage.artifact_name(naming, &input.id);
            let statistics = stage.statistics_name(naming, &input.id);
            let input_fingerprint = fingerprint(&name, &self.store.read_bytes(&input.name)?);

            match self
                .checkpoints
                .decide(&artifact, self.store.contains(&artifact), &input_fingerprint)?
            {
                CheckpointDecision::Skip => {
                    self.emit(&PipelineEvent::StageSkipped {
                        stage: name.clone(),
                        artifact: artifact.clone(),
                    });
                    report.skipped.push(artifact);
                    continue;
                }
                CheckpointDecision::Adopt => {
                    self.checkpoints.complete(&name, &artifact, &input_fingerprint)?;
                    self.emit(&PipelineEvent::StageSkipped {
                        stage: name.clone(),
                        artifact: artifact.clone(),
                    });
                    report.skipped.push(artifact);
                    continue;
                }
                CheckpointDecision::Rerun { reason } => {
                    warn!(stage = %name, %artifact, %reason, "Recomputing artifact");
                }
                CheckpointDecision::Run => {}
            }

            self.emit(&PipelineEvent::StageStarted {
                stage: name.clone(),
                input: input.name.clone(),
            });
            let timer = SpanTimer::start(format!("{name} {}", input.id));
            self.checkpoints.begin(&name, &artifact, &input_fingerprint)?;

            let output = stage.execute(&ctx, &input)?;
            self.store.write_table(&statistics, &output.statistics)?;
            self.store.write_table(&artifact, &output.artifact)?;
            self.checkpoints.complete(&name, &artifact, &input_fingerprint)?;

            self.emit(&PipelineEvent::StageCompleted {
                stage: name.clone(),
                artifact: artifact.clone(),
                cases: output.cases(),
                elapsed_ms: timer.finish(),
            });
            report.written.push(artifact);
        }

        Ok(report)
    }

    /// Projects every choreography corpus file.
    pub fn project(&self) -> Result<StageReport, BenchError> {
        self.run_stage(&ProjectionStage::new())
    }

    /// Extracts every projection file with `strategy`.
    pub fn extract(&self, strategy: Strategy) -> Result<StageReport, BenchError> {
        self.run_stage(&ExtractionStage::new(strategy))
    }

    /// Extracts with every configured strategy.
    pub fn extract_all(&self) -> Result<Vec<StageReport>, BenchError> {
        self.config
            .strategies
            .iter()
            .map(|&strategy| self.extract(strategy))
            .collect()
    }

    /// Fuzzes every plain projection file with `params`.
    pub fn fuzz(&self, params: FuzzParameters) -> Result<StageReport, BenchError> {
        self.run_stage(&FuzzStage::new(params))
    }

    /// Fuzzes with every configured parameter pair.
    pub fn fuzz_all(&self) -> Result<Vec<StageReport>, BenchError> {
        self.config
            .fuzz_parameters
            .iter()
            .map(|&params| self.fuzz(params))
            .collect()
    }

    /// Unrolls and shifts the projection files selected by the unroll
    /// pattern.
    pub fn unroll_and_shift(&self) -> Result<StageReport, BenchError> {
        self.run_stage(&UnrollStage::new(&self.config.unroll)?)
    }

    /// Checks every extraction of every configured strategy against its
    /// source choreography.
    pub fn verify_soundness(&self) -> Result<SoundnessReport, BenchError> {
        soundness::verify_soundness(
            &self.store,
            self.analyses.as_ref(),
            self.events.as_ref(),
            &self.config.strategies,
        )
    }

    /// Combines the statistics of `group` with those of `strategy` over
    /// `test_set` and writes the result.
    pub fn combine(
        &self,
        strategy: Strategy,
        group: Group,
        test_set: &TestSet,
    ) -> Result<Table, BenchError> {
        let table = Aggregator::new(&self.store).combine(strategy, group, &test_set.pattern)?;
        let name = self.store.naming().combined_file(strategy, group, &test_set.name);
        self.store.write_table(&name, &table)?;
        info!(file = %name, rows = table.len(), "Wrote combined statistics");
        Ok(table)
    }

    /// Lays the combined tables of every configured strategy side by side
    /// and writes the result. The combined tables must exist.
    pub fn pivot(&self, group: Group, test_set: &str) -> Result<Table, BenchError> {
        let table = stats::pivot(
            &self.store,
            &self.config.strategies,
            self.config.reference_strategy,
            group,
            test_set,
        )?;
        let name = self.store.naming().pivot_file(group, test_set);
        self.store.write_table(&name, &table)?;
        info!(file = %name, rows = table.len(), "Wrote pivoted statistics");
        Ok(table)
    }

    /// Combines and pivots every configured group and test set. Returns the
    /// names of the files written.
    pub fn make_combined_statistics(&self) -> Result<Vec<String>, BenchError> {
        self.store.ensure_output_directory()?;
        let naming = self.store.naming();
        let mut written = Vec::new();

        for &group in &self.config.groups {
            for test_set in &self.config.test_sets {
                for &strategy in &self.config.strategies {
                    self.combine(strategy, group, test_set)?;
                    written.push(naming.combined_file(strategy, group, &test_set.name));
                }
                self.pivot(group, &test_set.name)?;
                written.push(naming.pivot_file(group, &test_set.name));
            }
        }
        Ok(written)
    }

    /// Concatenates the plain extraction statistics of `strategy` into one
    /// file.
    pub fn accumulate(&self, strategy: Strategy) -> Result<Table, BenchError> {
        let table = stats::accumulate(&self.store, strategy)?;
        let name = self.store.naming().accumulated_file(strategy);
        self.store.write_table(&name, &table)?;
        info!(file = %name, rows = table.len(), "Wrote accumulated statistics");
        Ok(table)
    }

    /// Runs every stage, then builds the combined statistics.
    ///
    /// Extraction runs a second time after fuzzing and unrolling so that the
    /// derived networks get extracted too.
    pub fn run_all(&self) -> Result<RunSummary, BenchError> {
        let timer = SpanTimer::start("run_all");
        let mut stages = vec![self.project()?];
        stages.extend(self.extract_all()?);
        stages.extend(self.fuzz_all()?);
        stages.push(self.unroll_and_shift()?);
        stages.extend(self.extract_all()?);

        let statistics = self.make_combined_statistics()?;
        info!(
            stages = stages.len(),
            files = statistics.len(),
            elapsed_ms = timer.finish(),
            "Pipeline finished"
        );
        Ok(RunSummary { stages, statistics })
    }

    /// Lists the checkpoint records of the working directory.
    pub fn status(&self) -> Result<Vec<CheckpointRecord>, BenchError> {
        self.checkpoints.list()
    }
}
