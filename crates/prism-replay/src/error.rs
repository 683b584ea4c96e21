//! Replay errors.

use std::{io, path::PathBuf};

use prism_core::BatchDesync;
use thiserror::Error;

/// Errors from loading or replaying a script.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The script file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The script is not valid JSON or does not match the script format.
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch did not fit the projection and strict mode was requested.
    #[error("step {step}: {source}")]
    Desync {
        /// Zero-based step index.
        step: usize,
        /// What went wrong.
        #[source]
        source: BatchDesync,
    },

    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
