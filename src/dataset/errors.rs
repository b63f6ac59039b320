//! # Dataset Errors
//!
//! Hard failures of the file-system collaborator. Problems with file
//! *content* are findings, not errors; see the integrity module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// Data directory or file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file that must deserialize into a typed record did not
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A year file's declared `year` does not match its name, so a rewrite
    /// would land on another file
    #[error("{path} declares year {declared}, which belongs to {owner}")]
    YearConflict {
        path: PathBuf,
        declared: i32,
        owner: String,
    },

    /// A record could not be serialized for writing
    #[error("Cannot encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    /// Error code string in the crate's `SPLIT_*` convention
    pub fn code(&self) -> &'static str {
        match self {
            DatasetError::Io { .. } => "SPLIT_DATASET_IO",
            DatasetError::Decode { .. } => "SPLIT_DATASET_DECODE",
            DatasetError::YearConflict { .. } => "SPLIT_DATASET_YEAR_CONFLICT",
            DatasetError::Encode { .. } => "SPLIT_DATASET_ENCODE",
        }
    }
}
