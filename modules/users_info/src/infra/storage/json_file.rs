use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::infra::storage::entity::Document;

/// Failures of the backing file
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("data file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("data file {path} is not a valid document: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("data file {path} has no ids left to allocate")]
    IdsExhausted { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Whole-document accessor for one JSON file.
///
/// Every call goes to disk. Nothing is cached and nothing is locked, so two
/// overlapping read-modify-write cycles can lose one of the updates.
/// Timestamps are kept at millisecond precision; finer digits in a
/// hand-edited file are dropped on read.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Document, StorageError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Serialize with two-space indentation and replace the file contents.
    pub async fn write(&self, doc: &Document) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), users = doc.users.len(), "document written");
        Ok(())
    }

    pub async fn exists(&self) -> Result<bool, StorageError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Write an empty document when the file is absent. Returns true if created.
    pub async fn ensure_initialized(&self) -> Result<bool, StorageError> {
        if self.exists().await? {
            return Ok(false);
        }
        self.write(&Document::default()).await?;
        info!(path = %self.path.display(), "created empty data file");
        Ok(true)
    }

    /// Copy the current file to `<file>.backup.<timestamp>`.
    pub async fn backup(&self) -> Result<PathBuf, StorageError> {
        let stamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".backup.{stamp}"));
        let target = PathBuf::from(name);

        tokio::fs::copy(&self.path, &target)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        info!(from = %self.path.display(), to = %target.display(), "data file backed up");
        Ok(target)
    }
}
