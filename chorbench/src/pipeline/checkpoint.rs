//! Checkpoint records for stage outputs.
//!
//! Each artifact written by a stage gets a small JSON record under
//! `<working dir>/.checkpoints/` naming the stage, a fingerprint of the
//! stage input and whether the write finished. A rerun consults the record to
//! decide whether the artifact is still current.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::BenchError;
use crate::store::write_atomic;

/// Directory, relative to the working directory, holding checkpoint records.
pub const CHECKPOINT_DIR: &str = ".checkpoints";

/// How stage outputs are judged up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointMode {
    /// The artifact file existing is enough.
    Presence,
    /// The artifact must have a completed record for the current input.
    #[default]
    Fingerprint,
}

/// Progress of one artifact write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// The stage started writing and has not confirmed completion.
    InProgress,
    /// The artifact and its statistics were written.
    Completed,
}

/// Persisted state of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Stage key, e.g. `extraction:Random`.
    pub stage: String,
    /// Artifact file name.
    pub artifact: String,
    /// Fingerprint of the stage key and input bytes.
    pub input_fingerprint: String,
    /// Write status.
    pub status: CheckpointStatus,
    /// Run that last touched the record.
    pub run_id: Uuid,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// What a stage should do about one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointDecision {
    /// No artifact yet.
    Run,
    /// The artifact exists but is stale or incomplete.
    Rerun {
        /// Why the artifact is not trusted.
        reason: String,
    },
    /// The artifact is current.
    Skip,
    /// The artifact exists without a record; it is accepted as is.
    Adopt,
}

impl CheckpointDecision {
    /// Returns true if the stage must compute the artifact.
    #[must_use]
    pub fn needs_run(&self) -> bool {
        matches!(self, Self::Run | Self::Rerun { .. })
    }
}

/// Fingerprints a stage input: SHA-256 over the stage key and input bytes.
#[must_use]
pub fn fingerprint(stage: &str, input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stage.as_bytes());
    hasher.update([0u8]);
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Reads and writes checkpoint records of one working directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    mode: CheckpointMode,
    run_id: Uuid,
}

impl CheckpointStore {
    /// Creates a store for the working directory `root`.
    #[must_use]
    pub fn new(root: &Path, mode: CheckpointMode) -> Self {
        Self {
            dir: root.join(CHECKPOINT_DIR),
            mode,
            run_id: Uuid::new_v4(),
        }
    }

    /// Returns the mode.
    #[must_use]
    pub fn mode(&self) -> CheckpointMode {
        self.mode
    }

    /// Returns the id of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn record_path(&self, artifact: &str) -> PathBuf {
        self.dir.join(format!("{artifact}.json"))
    }

    /// Loads the record of `artifact`, if any.
    pub fn load(&self, artifact: &str) -> Result<Option<CheckpointRecord>, BenchError> {
        match fs::read_to_string(self.record_path(artifact)) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every record, sorted by artifact name.
    pub fn list(&self) -> Result<Vec<CheckpointRecord>, BenchError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path)?;
                records.push(serde_json::from_str::<CheckpointRecord>(&json)?);
            }
        }
        records.sort_by(|a, b| a.artifact.cmp(&b.artifact));
        Ok(records)
    }

    /// Decides whether `artifact` must be (re)computed.
    pub fn decide(
        &self,
        artifact: &str,
        artifact_exists: bool,
        input_fingerprint: &str,
    ) -> Result<CheckpointDecision, BenchError> {
        if !artifact_exists {
            return Ok(CheckpointDecision::Run);
        }
        if self.mode == CheckpointMode::Presence {
            return Ok(CheckpointDecision::Skip);
        }

        let decision = match self.load(artifact)? {
            None => CheckpointDecision::Adopt,
            Some(record) if record.status == CheckpointStatus::InProgress => {
                CheckpointDecision::Rerun {
                    reason: "previous run did not complete".to_string(),
                }
            }
            Some(record) if record.input_fingerprint != input_fingerprint => {
                CheckpointDecision::Rerun {
                    reason: "input changed".to_string(),
                }
            }
            Some(_) => CheckpointDecision::Skip,
        };
        Ok(decision)
    }

    /// Marks `artifact` as being written.
    pub fn begin(
        &self,
        stage: &str,
        artifact: &str,
        input_fingerprint: &str,
    ) -> Result<(), BenchError> {
        self.write(stage, artifact, input_fingerprint, CheckpointStatus::InProgress)
    }

    /// Marks `artifact` as written.
    pub fn complete(
        &self,
        stage: &str,
        artifact: &str,
        input_fingerprint: &str,
    ) -> Result<(), BenchError> {
        self.write(stage, artifact, input_fingerprint, CheckpointStatus::Completed)
    }

    fn write(
        &self,
        stage: &str,
        artifact: &str,
        input_fingerprint: &str,
        status: CheckpointStatus,
    ) -> Result<(), BenchError> {
        if self.mode == CheckpointMode::Presence {
            return Ok(());
        }
        let record = CheckpointRecord {
            stage: stage.to_string(),
            artifact: artifact.to_string(),
            input_fingerprint: input_fingerprint.to_string(),
            status,
            run_id: self.run_id,
            updated_at: Utc::now(),
        };
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&record)?;
        write_atomic(&self.dir, &self.record_path(artifact), &json)
    }
}
