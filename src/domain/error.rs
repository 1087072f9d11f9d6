//! Typed errors for each stage of the pipeline.
//!
//! Use cases wrap these in `anyhow::Error` with context; the variants
//! stay matchable where a caller needs to recover (training interruption).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or querying a word-vector table.
#[derive(Debug, Error)]
pub enum VectorError {
    /// A line of the embedding file does not have the shape set by the first line.
    #[error("malformed vector file at line {line}: {reason}")]
    Malformed {
        /// 1-based line number in the source
        line: usize,
        reason: String,
    },

    /// Lookup of a token that is not in the vocabulary, with no zero token to fall back on.
    #[error("unknown token '{0}' and no zero token configured")]
    UnknownToken(String),

    #[error("cannot read vector source '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VectorError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors raised while locating or reading the review corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Expected `<root>/<split>/<class>` directory is missing.
    #[error("corpus layout incomplete: missing directory '{0}'")]
    Integrity(PathBuf),

    #[error("corpus fetch failed: {0}")]
    Fetch(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("segmentation failed for '{source_name}': {message}")]
    Segmentation { source_name: String, message: String },
}

/// Errors raised by a model trainer.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The user asked training to stop (Ctrl-C). Not a failure:
    /// the caller reloads the best checkpoint and carries on.
    #[error("training interrupted after {epochs_completed} epoch(s)")]
    Interrupted { epochs_completed: usize },

    #[error("invalid training input: {0}")]
    InvalidInput(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}
