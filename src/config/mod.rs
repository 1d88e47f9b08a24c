// src/config/mod.rs
//! Explicit analysis configuration
//!
//! Every tunable of the pipeline (anchor id, trim window, envelope window,
//! threshold fraction, sub-epoch layout) lives in [`AnalysisConfig`] and is
//! handed to each stage. Nothing is read from module-level globals.

pub mod analysis_config;
pub mod batch_config;
pub mod constants;
pub mod loader;

pub use analysis_config::*;
pub use batch_config::*;
pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};

/// Complete configuration of one analysis run
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Id of the event that marks task onset
    #[serde(default = "defaults::anchor_event_id")]
    pub anchor_event_id: String,

    #[serde(default)]
    pub epoch: EpochConfig,

    #[serde(default)]
    pub envelope: EnvelopeConfig,

    #[serde(default)]
    pub threshold: ThresholdConfig,

    #[serde(default)]
    pub bandpass: BandpassConfig,
}

/// Default value providers using constants
pub(crate) mod defaults {
    use super::constants::*;
    use super::{EnvelopeMethod, PeakMode};

    pub fn anchor_event_id() -> String { events::DEFAULT_ANCHOR_EVENT_ID.to_string() }

    pub fn pre_roll_s() -> f64 { epoch::DEFAULT_PRE_ROLL_S }
    pub fn task_window_s() -> f64 { epoch::DEFAULT_TASK_WINDOW_S }
    pub fn sub_epoch_length_s() -> f64 { epoch::DEFAULT_SUB_EPOCH_LENGTH_S }
    pub fn sub_epoch_count() -> usize { epoch::DEFAULT_SUB_EPOCH_COUNT }

    pub fn envelope_method() -> EnvelopeMethod { EnvelopeMethod::Smoothing }
    pub fn smoothing_window_samples() -> usize { envelope::DEFAULT_SMOOTHING_WINDOW_SAMPLES }
    pub fn rms_window_ms() -> f64 { envelope::DEFAULT_RMS_WINDOW_MS }

    pub fn threshold_fraction() -> f64 { threshold::DEFAULT_THRESHOLD_FRACTION }
    pub fn raw_peak_mode() -> PeakMode { PeakMode::Signed }
    pub fn envelope_peak_mode() -> PeakMode { PeakMode::Absolute }

    pub fn low_cut_hz() -> f64 { filter::DEFAULT_LOW_CUT_HZ }
    pub fn high_cut_hz() -> f64 { filter::DEFAULT_HIGH_CUT_HZ }
    pub fn filter_order() -> usize { filter::DEFAULT_ORDER }

    pub fn recording_template() -> String { paths::DEFAULT_RECORDING_TEMPLATE.to_string() }
    pub fn events_template() -> String { paths::DEFAULT_EVENTS_TEMPLATE.to_string() }
    pub fn output_dir() -> std::path::PathBuf { paths::DEFAULT_OUTPUT_DIR.into() }
    pub fn parallel() -> bool { false }
    pub fn channel() -> usize { 0 }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anchor_event_id: defaults::anchor_event_id(),
            epoch: EpochConfig::default(),
            envelope: EnvelopeConfig::default(),
            threshold: ThresholdConfig::default(),
            bandpass: BandpassConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Validate values that do not depend on the recording
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.anchor_event_id.trim().is_empty() {
            errors.push("anchor_event_id must not be empty".to_string());
        }

        let epoch = &self.epoch;
        if !(epoch.pre_roll_s.is_finite() && epoch.pre_roll_s >= 0.0) {
            errors.push(format!("epoch.pre_roll_s must be >= 0, got {}", epoch.pre_roll_s));
        }
        if !(epoch.task_window_s.is_finite() && epoch.task_window_s > 0.0) {
            errors.push(format!("epoch.task_window_s must be > 0, got {}", epoch.task_window_s));
        }
        if !(epoch.sub_epoch_length_s.is_finite() && epoch.sub_epoch_length_s > 0.0) {
            errors.push(format!(
                "epoch.sub_epoch_length_s must be > 0, got {}",
                epoch.sub_epoch_length_s
            ));
        }

        let envelope = &self.envelope;
        if envelope.smoothing_window_samples == 0 {
            errors.push("envelope.smoothing_window_samples must be at least 1".to_string());
        }
        if !(envelope.rms_window_ms.is_finite() && envelope.rms_window_ms > 0.0) {
            errors.push(format!(
                "envelope.rms_window_ms must be > 0, got {}",
                envelope.rms_window_ms
            ));
        }

        let fraction = self.threshold.fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            errors.push(format!("threshold.fraction must lie in (0, 1], got {}", fraction));
        }

        let bandpass = &self.bandpass;
        if bandpass.enabled {
            if bandpass.order < filter::MIN_ORDER
                || bandpass.order > filter::MAX_ORDER
                || bandpass.order % 2 != 0
            {
                errors.push(format!(
                    "bandpass.order must be even and within {}..={}, got {}",
                    filter::MIN_ORDER,
                    filter::MAX_ORDER,
                    bandpass.order
                ));
            }
            if !(bandpass.low_cut_hz > 0.0 && bandpass.low_cut_hz < bandpass.high_cut_hz) {
                errors.push(format!(
                    "bandpass band [{}, {}] Hz is empty or non-positive",
                    bandpass.low_cut_hz, bandpass.high_cut_hz
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate configuration consistency against a recording's sample rate
    pub fn validate_consistency(&self, sample_rate_hz: u32) -> Result<(), Vec<String>> {
        let mut errors = self.validate().err().unwrap_or_default();

        if sample_rate_hz == 0 {
            errors.push("sample rate must be > 0".to_string());
        } else {
            if self.envelope.method == EnvelopeMethod::Rms
                && self.envelope.rms_window_samples(sample_rate_hz) == 0
            {
                errors.push(format!(
                    "envelope.rms_window_ms ({} ms) is shorter than one sample at {} Hz",
                    self.envelope.rms_window_ms, sample_rate_hz
                ));
            }

            let nyquist = sample_rate_hz as f64 / 2.0;
            if self.bandpass.enabled && self.bandpass.high_cut_hz >= nyquist {
                errors.push(format!(
                    "bandpass.high_cut_hz ({} Hz) must be less than Nyquist frequency ({} Hz)",
                    self.bandpass.high_cut_hz, nyquist
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn get_summary(&self, sample_rate_hz: u32) -> ConfigSummary {
        ConfigSummary {
            anchor_event_id: self.anchor_event_id.clone(),
            envelope_method: self.envelope.method,
            envelope_window_samples: self.envelope.window_samples(sample_rate_hz),
            threshold_fraction: self.threshold.fraction,
            bandpass_enabled: self.bandpass.enabled,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSummary {
    pub anchor_event_id: String,
    pub envelope_method: EnvelopeMethod,
    pub envelope_window_samples: usize,
    pub threshold_fraction: f64,
    pub bandpass_enabled: bool,
}
