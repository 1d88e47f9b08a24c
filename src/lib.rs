//! EMG-Epoch: offline EMG segmentation and activation detection library
//!
//! This library turns a single-channel EMG recording plus its event log into
//! an aligned set of analysis products. It features:
//!
//! - Event log parsing and anchor lookup
//! - Epoch trimming around the task-onset event with re-anchoring
//! - Optional zero-phase Butterworth band-pass conditioning
//! - Smoothed or sliding-RMS amplitude envelopes
//! - Adaptive peak-relative threshold detection
//! - Sub-epoch boundary layout
//! - TOML configuration with environment overrides
//! - Batch processing over (date, subject) sessions
//!
//! # Quick Start
//!
//! ```rust
//! use emg_epoch::{AnalysisConfig, AnalysisPipeline, EventLog, Recording};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut samples = vec![0.0; 1000];
//!     samples[500..=510].fill(1.0);
//!     let recording = Recording::new(samples, 1000)?;
//!     let events = EventLog::parse("2,0.5\n");
//!
//!     let mut config = AnalysisConfig::default();
//!     config.envelope.smoothing_window_samples = 11;
//!
//!     let report = AnalysisPipeline::new(config)?.run(&recording, &events)?;
//!     assert_eq!(report.raw_crossings.count, 11);
//!     assert_eq!(report.epoch_boundaries[0], 10.0);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod processing;
pub mod recording;
pub mod report;

// Re-export commonly used types for convenience
pub use batch::{BatchRunner, BatchSummary, SessionOutcome, SessionStatus};
pub use config::{AnalysisConfig, BatchConfig, ConfigLoader, SessionSpec};
pub use error::{EmgError, EmgResult};
pub use events::{read_events, Event, EventLog};
pub use processing::{
    epoch_boundaries, rectify, time_axis, AnalysisPipeline, Crossings, Envelope, EnvelopeExtractor,
    EpochTrimmer, ThresholdDetector, TrimmedEpoch,
};
#[cfg(feature = "wav")]
pub use recording::WavSource;
pub use recording::{Recording, SampleSource};
pub use report::{AnalysisReport, ReportMetadata};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    let mut features = vec![
        "Event log parsing".to_string(),
        "Epoch trimming".to_string(),
        "Envelope extraction".to_string(),
        "Adaptive threshold detection".to_string(),
        "Batch session processing".to_string(),
    ];
    if cfg!(feature = "wav") {
        features.push("WAV recordings".to_string());
    }

    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Offline EMG segmentation and activation detection library".to_string(),
        features,
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "emg-epoch");
    }
}
