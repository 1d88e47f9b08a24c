// src/processing/trimmer.rs
//! Epoch trimming around the anchor event

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EpochConfig;
use crate::error::{EmgError, EmgResult};
use crate::processing::time_axis::time_axis;
use crate::recording::Recording;

/// Signal restricted to `[anchor - pre_roll, anchor + task_window]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedEpoch {
    pub samples: Vec<f64>,
    /// Rebuilt from the trimmed length, starts at 0
    pub time_axis: Vec<f64>,
    pub sample_rate_hz: u32,
    /// Re-anchored event time, always the configured pre-roll
    pub anchor_s: f64,
    /// Anchor time in the untrimmed recording
    pub source_anchor_s: f64,
    /// Index of the first kept sample in the untrimmed recording
    pub source_start_index: usize,
    /// The window reached before the first sample
    pub clipped_start: bool,
    /// The window reached past the last sample
    pub clipped_end: bool,
}

impl TrimmedEpoch {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }
}

/// Slices a recording to a fixed window around an anchor time
#[derive(Debug, Clone, PartialEq)]
pub struct EpochTrimmer {
    pre_roll_s: f64,
    task_window_s: f64,
}

impl EpochTrimmer {
    pub fn new(config: &EpochConfig) -> Self {
        Self {
            pre_roll_s: config.pre_roll_s,
            task_window_s: config.task_window_s,
        }
    }

    /// Trim a recording, building its time axis first
    pub fn trim_recording(&self, recording: &Recording, anchor_s: f64) -> EmgResult<TrimmedEpoch> {
        let axis = time_axis(recording.len(), recording.sample_rate_hz());
        self.trim(recording.samples(), &axis, recording.sample_rate_hz(), anchor_s)
    }

    /// Keep samples whose axis value lies in the closed trim window
    ///
    /// A window reaching outside the recording just keeps fewer samples. A
    /// window that misses the recording entirely is an [`EmgError::EmptyEpoch`].
    pub fn trim(
        &self,
        samples: &[f64],
        axis: &[f64],
        sample_rate_hz: u32,
        anchor_s: f64,
    ) -> EmgResult<TrimmedEpoch> {
        if samples.len() != axis.len() {
            return Err(EmgError::invalid_data(
                "time axis",
                format!("{} axis values for {} samples", axis.len(), samples.len()),
            ));
        }
        if sample_rate_hz == 0 {
            return Err(EmgError::invalid_data("recording", "sample rate must be > 0"));
        }
        if !anchor_s.is_finite() {
            return Err(EmgError::invalid_data("anchor time", format!("{}", anchor_s)));
        }

        let start_s = anchor_s - self.pre_roll_s;
        let end_s = anchor_s + self.task_window_s;

        // The axis is sorted, so the kept samples form one contiguous run
        let start = axis.partition_point(|&t| t < start_s);
        let end = axis.partition_point(|&t| t <= end_s);

        if start >= end {
            return Err(EmgError::EmptyEpoch {
                start_s,
                end_s,
                duration_s: samples.len() as f64 / sample_rate_hz as f64,
            });
        }

        let clipped_start = axis.first().is_some_and(|&first| start_s < first);
        let clipped_end = axis.last().is_some_and(|&last| end_s > last);
        if clipped_start {
            warn!(
                anchor_s,
                pre_roll_s = self.pre_roll_s,
                "pre-roll window starts before the recording, re-anchored time overstates the kept pre-roll"
            );
        }

        let kept = samples[start..end].to_vec();
        let axis = time_axis(kept.len(), sample_rate_hz);

        debug!(
            start_index = start,
            kept = kept.len(),
            window_start_s = start_s,
            window_end_s = end_s,
            "trimmed epoch"
        );

        Ok(TrimmedEpoch {
            samples: kept,
            time_axis: axis,
            sample_rate_hz,
            anchor_s: self.pre_roll_s,
            source_anchor_s: anchor_s,
            source_start_index: start,
            clipped_start,
            clipped_end,
        })
    }
}
