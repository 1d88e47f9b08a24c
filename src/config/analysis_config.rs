// src/config/analysis_config.rs
//! Per-stage analysis configuration structures

use serde::{Deserialize, Serialize};

use super::defaults;

/// Epoch trimming and sub-epoch layout
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EpochConfig {
    /// Seconds kept before the anchor event
    #[serde(default = "defaults::pre_roll_s")]
    pub pre_roll_s: f64,

    /// Seconds kept after the anchor event
    #[serde(default = "defaults::task_window_s")]
    pub task_window_s: f64,

    #[serde(default = "defaults::sub_epoch_length_s")]
    pub sub_epoch_length_s: f64,

    #[serde(default = "defaults::sub_epoch_count")]
    pub sub_epoch_count: usize,
}

/// Envelope extraction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeMethod {
    /// Centered moving average, output as long as the input
    Smoothing,
    /// Sliding-window root mean square, output shorter by `window - 1`
    Rms,
}

/// Envelope extraction configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EnvelopeConfig {
    #[serde(default = "defaults::envelope_method")]
    pub method: EnvelopeMethod,

    #[serde(default = "defaults::smoothing_window_samples")]
    pub smoothing_window_samples: usize,

    #[serde(default = "defaults::rms_window_ms")]
    pub rms_window_ms: f64,
}

impl EnvelopeConfig {
    /// RMS window length in samples, truncated toward zero
    pub fn rms_window_samples(&self, sample_rate_hz: u32) -> usize {
        let samples = self.rms_window_ms * sample_rate_hz as f64
            / super::constants::envelope::MILLISECONDS_PER_SECOND;
        if samples.is_finite() && samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }

    /// Window length in samples for the configured method
    pub fn window_samples(&self, sample_rate_hz: u32) -> usize {
        match self.method {
            EnvelopeMethod::Smoothing => self.smoothing_window_samples,
            EnvelopeMethod::Rms => self.rms_window_samples(sample_rate_hz),
        }
    }
}

/// How the peak of a signal is taken when deriving its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakMode {
    /// Peak of `|S|`
    Absolute,
    /// Peak of `S` itself
    Signed,
}

/// Adaptive threshold configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Fraction of the signal peak used as threshold
    #[serde(default = "defaults::threshold_fraction")]
    pub fraction: f64,

    /// Peak rule for the conditioned signal, which may be negative
    #[serde(default = "defaults::raw_peak_mode")]
    pub raw_peak: PeakMode,

    /// Peak rule for the envelope
    #[serde(default = "defaults::envelope_peak_mode")]
    pub envelope_peak: PeakMode,
}

/// Optional zero-phase Butterworth band-pass applied before rectification
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BandpassConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::low_cut_hz")]
    pub low_cut_hz: f64,

    #[serde(default = "defaults::high_cut_hz")]
    pub high_cut_hz: f64,

    #[serde(default = "defaults::filter_order")]
    pub order: usize,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            pre_roll_s: defaults::pre_roll_s(),
            task_window_s: defaults::task_window_s(),
            sub_epoch_length_s: defaults::sub_epoch_length_s(),
            sub_epoch_count: defaults::sub_epoch_count(),
        }
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            method: defaults::envelope_method(),
            smoothing_window_samples: defaults::smoothing_window_samples(),
            rms_window_ms: defaults::rms_window_ms(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fraction: defaults::threshold_fraction(),
            raw_peak: defaults::raw_peak_mode(),
            envelope_peak: defaults::envelope_peak_mode(),
        }
    }
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            low_cut_hz: defaults::low_cut_hz(),
            high_cut_hz: defaults::high_cut_hz(),
            order: defaults::filter_order(),
        }
    }
}
