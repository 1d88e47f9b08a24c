// src/report.rs
//! Analysis output handed to plotting and other downstream consumers
//!
//! Every sequence in the report is index-aligned with a time axis:
//! `signal` and `raw_crossings` with `time_axis`, `envelope` and
//! `envelope_crossings` with `envelope_time_axis`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EnvelopeMethod;
use crate::error::{EmgError, EmgResult};
use crate::processing::threshold::Crossings;

/// Scalars describing how the report was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub sample_rate_hz: u32,
    pub anchor_event_id: String,
    /// Anchor time in the untrimmed recording
    pub source_anchor_s: f64,
    /// Anchor time on the trimmed axis
    pub anchor_s: f64,
    pub source_start_index: usize,
    pub clipped_start: bool,
    pub clipped_end: bool,
    pub envelope_method: EnvelopeMethod,
    pub envelope_window_samples: usize,
    pub bandpass_enabled: bool,
}

/// Full result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub time_axis: Vec<f64>,
    /// Trimmed signal, band-passed when the pre-filter is enabled
    pub signal: Vec<f64>,
    pub envelope: Vec<f64>,
    pub envelope_time_axis: Vec<f64>,
    pub raw_crossings: Crossings,
    pub envelope_crossings: Crossings,
    pub epoch_boundaries: Vec<f64>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> EmgResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the report as JSON, creating parent directories
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> EmgResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EmgError::io(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| EmgError::io(path, e))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> EmgResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| EmgError::io(path, e))?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Times at which the raw signal crossed its threshold
    pub fn raw_crossing_times(&self) -> Vec<f64> {
        self.raw_crossings.times(&self.time_axis)
    }

    /// Times at which the envelope crossed its threshold
    pub fn envelope_crossing_times(&self) -> Vec<f64> {
        self.envelope_crossings.times(&self.envelope_time_axis)
    }
}
