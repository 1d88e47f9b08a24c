// src/processing/threshold.rs
//! Adaptive threshold crossing detection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PeakMode, ThresholdConfig};

/// Threshold and per-sample crossing mask of one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossings {
    pub threshold: f64,
    /// `signal[i] > threshold`, same length as the signal
    pub mask: Vec<bool>,
    pub count: usize,
}

impl Crossings {
    /// Indices where the mask is set
    pub fn indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &crossed)| crossed.then_some(i))
            .collect()
    }

    /// Times of the crossing samples on an axis aligned with the signal
    pub fn times(&self, axis: &[f64]) -> Vec<f64> {
        self.mask
            .iter()
            .zip(axis.iter())
            .filter_map(|(&crossed, &t)| crossed.then_some(t))
            .collect()
    }
}

/// Threshold at a fixed fraction of a signal's own peak
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdDetector {
    fraction: f64,
    peak: PeakMode,
}

impl ThresholdDetector {
    pub fn new(fraction: f64, peak: PeakMode) -> Self {
        Self { fraction, peak }
    }

    /// Detector for the trimmed, possibly signed signal
    pub fn raw_from_config(config: &ThresholdConfig) -> Self {
        Self::new(config.fraction, config.raw_peak)
    }

    /// Detector for the envelope
    pub fn envelope_from_config(config: &ThresholdConfig) -> Self {
        Self::new(config.fraction, config.envelope_peak)
    }

    /// `fraction * peak`, where the peak of an empty signal is 0
    pub fn threshold(&self, signal: &[f64]) -> f64 {
        let peak = match self.peak {
            PeakMode::Absolute => signal.iter().fold(0.0f64, |acc, x| acc.max(x.abs())),
            PeakMode::Signed => signal
                .iter()
                .copied()
                .reduce(f64::max)
                .unwrap_or(0.0),
        };
        self.fraction * peak
    }

    /// Mark every sample strictly above the signal's threshold
    ///
    /// No hysteresis or debouncing: a single sample above threshold counts.
    /// A flat zero signal has threshold 0 and no crossings.
    pub fn detect(&self, signal: &[f64]) -> Crossings {
        let threshold = self.threshold(signal);
        let mask: Vec<bool> = signal.iter().map(|&x| x > threshold).collect();
        let count = mask.iter().filter(|&&crossed| crossed).count();

        debug!(threshold, crossings = count, samples = signal.len(), "detected threshold crossings");

        Crossings {
            threshold,
            mask,
            count,
        }
    }
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self::raw_from_config(&ThresholdConfig::default())
    }
}
