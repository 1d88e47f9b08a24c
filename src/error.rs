// src/error.rs
//! Unified error handling for EMG epoch analysis
//!
//! Every fallible operation in the crate returns [`EmgResult`]. Errors carry
//! enough context (stage, sizes, paths) to tell which session failed and why,
//! so a batch driver can log them and move on to the next session.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Unified error type for the analysis pipeline
#[derive(Debug, Error)]
pub enum EmgError {
    /// The event log holds no event with the requested anchor id
    #[error("[ANCHOR] no event with id '{event_id}' found, cannot segment recording")]
    NoAnchorEvent { event_id: String },

    /// A sliding window is longer than the sequence it slides over
    #[error("[WINDOW] {stage} window of {window} samples exceeds the {available} available samples")]
    WindowTooLarge {
        stage: ProcessingStage,
        window: usize,
        available: usize,
    },

    /// The trim window does not overlap the recording at all
    #[error("[EPOCH] trim window [{start_s:.3}, {end_s:.3}] s holds no samples of a {duration_s:.3} s recording")]
    EmptyEpoch {
        start_s: f64,
        end_s: f64,
        duration_s: f64,
    },

    /// Invalid input data
    #[error("[DATA] invalid {data_type}: {reason}")]
    InvalidData { data_type: String, reason: String },

    /// Invalid analysis parameters
    #[error("[CONFIG] configuration error in {component}: {reason}")]
    Configuration { component: String, reason: String },

    /// Configuration file loading errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File system errors from the collaborators
    #[error("[IO] {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recording could not be decoded
    #[error("[DECODE] failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Report serialization errors
    #[error("[EXPORT] failed to serialize report: {0}")]
    Export(#[from] serde_json::Error),
}

/// Windowed stages, for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    Smoothing,
    Rms,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcessingStage::Smoothing => "smoothing",
            ProcessingStage::Rms => "rms",
        };
        f.write_str(name)
    }
}

/// Result type alias for EMG operations
pub type EmgResult<T> = Result<T, EmgError>;

impl EmgError {
    /// Shorthand for [`EmgError::InvalidData`]
    pub fn invalid_data(data_type: &str, reason: impl Into<String>) -> Self {
        EmgError::InvalidData {
            data_type: data_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EmgError::Configuration`]
    pub fn configuration(component: &str, reason: impl Into<String>) -> Self {
        EmgError::Configuration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EmgError::Io {
            path: path.into(),
            source,
        }
    }
}
