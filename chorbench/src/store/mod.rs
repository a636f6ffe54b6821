//! Corpus store: the working directory holding every corpus, artifact and
//! statistics file of a run.
//!
//! The store maps `(stage prefix, file id)` pairs to paths, lists the files
//! of a stage and writes files atomically, so an interrupted run never leaves
//! a partial file behind that would later pass for a finished one.

mod artifacts;
mod corpus;
mod naming;

pub use artifacts::{
    extraction_table, network_table, parse_extractions, parse_networks, EXTRACTION_HEADER,
    NETWORK_HEADER,
};
pub use corpus::{parse_corpus, CaseMap};
pub use naming::NamingScheme;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::codec::Table;
use crate::core::FileId;
use crate::errors::BenchError;

/// A file found under a stage prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// The suffix after the prefix.
    pub id: FileId,
    /// Full file name.
    pub name: String,
    /// Full path.
    pub path: PathBuf,
}

/// File-system backed corpus store.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    root: PathBuf,
    naming: NamingScheme,
}

impl CorpusStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, naming: NamingScheme) -> Self {
        Self {
            root: root.into(),
            naming,
        }
    }

    /// Returns the working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the naming scheme.
    #[must_use]
    pub fn naming(&self) -> &NamingScheme {
        &self.naming
    }

    /// Returns the path of a file inside the working directory.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates the working directory if it is missing.
    pub fn ensure_output_directory(&self) -> Result<(), BenchError> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            tracing::debug!(path = %self.root.display(), "Created working directory");
            Ok(())
        } else if self.root.is_dir() {
            Ok(())
        } else {
            Err(BenchError::OutputPathConflict {
                path: self.root.clone(),
            })
        }
    }

    /// Lists every regular file whose name starts with `prefix`, sorted by
    /// file id.
    pub fn list_files(&self, prefix: &str) -> Result<Vec<StoredFile>, BenchError> {
        if !self.root.is_dir() {
            return Err(BenchError::NotADirectory {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(id) = name.strip_prefix(prefix) {
                files.push(StoredFile {
                    id: FileId::new(id),
                    path: entry.path(),
                    name,
                });
            }
        }
        files.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(files)
    }

    /// Returns true if `<prefix><file>` exists.
    #[must_use]
    pub fn exists(&self, prefix: &str, file: &FileId) -> bool {
        self.contains(&format!("{prefix}{file}"))
    }

    /// Returns true if a file with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Reads a file as text. A missing file is a [`BenchError::MissingArtifact`].
    pub fn read(&self, name: &str) -> Result<String, BenchError> {
        match fs::read_to_string(self.path(name)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BenchError::missing_artifact(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the raw bytes of a file.
    pub fn read_bytes(&self, name: &str) -> Result<Vec<u8>, BenchError> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BenchError::missing_artifact(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a file by persisting a temporary file over the target.
    pub fn write_atomic(&self, name: &str, contents: &str) -> Result<(), BenchError> {
        write_atomic(&self.root, &self.path(name), contents)
    }

    /// Writes a table under `name`.
    pub fn write_table(&self, name: &str, table: &Table) -> Result<(), BenchError> {
        self.write_atomic(name, &table.to_tsv())
    }

    /// Reads and parses a table.
    pub fn read_table(&self, name: &str) -> Result<Table, BenchError> {
        let text = self.read(name)?;
        Ok(Table::parse(name, &text)?)
    }

    /// Reads a choreography corpus file.
    pub fn read_corpus(&self, name: &str) -> Result<CaseMap, BenchError> {
        let text = self.read(name)?;
        Ok(parse_corpus(name, &text)?)
    }

    /// Reads a network artifact file.
    pub fn read_networks(&self, name: &str) -> Result<CaseMap, BenchError> {
        let text = self.read(name)?;
        Ok(parse_networks(name, &text)?)
    }

    /// Reads an extraction artifact file.
    pub fn read_extractions(&self, name: &str) -> Result<CaseMap, BenchError> {
        let text = self.read(name)?;
        Ok(parse_extractions(name, &text)?)
    }
}

/// Writes `contents` to `target` through a temporary file in `dir`.
pub(crate) fn write_atomic(dir: &Path, target: &Path, contents: &str) -> Result<(), BenchError> {
    let mut file = tempfile::Builder::new().prefix(".tmp-").tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(target).map_err(|e| BenchError::Io(e.error))?;
    Ok(())
}
