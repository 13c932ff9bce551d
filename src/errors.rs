//! Error taxonomy for the config-cleaning pipeline
//!
//! Read and definition errors are recoverable at the smallest scope (one
//! symbol or one allow-list definition); write and repository errors abort
//! the run because further overrides could not be recorded consistently.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while scanning, disabling, and committing config changes
#[derive(Error, Debug)]
pub enum KocleanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write override {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("repository operation failed: {0}")]
    Repository(String),

    #[error("malformed allow-list definition {path}: {reason}")]
    Definition { path: PathBuf, reason: String },
}

/// Result type for config-cleaning operations
pub type Result<T> = std::result::Result<T, KocleanError>;
