// src/processing/envelope.rs
//! Amplitude envelope extraction
//!
//! Both estimators run over a full-wave rectified signal:
//! - centered moving average with zero-padded edges, output as long as the input
//! - sliding-window RMS over `input[i..i + W]`, output shorter by `W - 1`
//!
//! Window sums come from a running sum that is recomputed exactly once per
//! window length, which keeps the cost linear while bounding rounding drift.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EnvelopeConfig, EnvelopeMethod};
use crate::error::{EmgError, EmgResult, ProcessingStage};

/// Full-wave rectification
pub fn rectify(signal: &[f64]) -> Vec<f64> {
    signal.iter().map(|x| x.abs()).collect()
}

/// Centered moving average of odd or even length `window`
///
/// Matches a "same"-mode convolution with a uniform kernel: samples past
/// either end count as zero, so the first and last `window / 2` outputs are
/// attenuated. For even windows the extra sample sits on the left.
pub fn moving_average(signal: &[f64], window: usize) -> EmgResult<Vec<f64>> {
    check_window(ProcessingStage::Smoothing, window, signal.len())?;

    let right = (window - 1) / 2;
    let left = window - 1 - right;

    let mut padded = Vec::with_capacity(signal.len() + window - 1);
    padded.extend(std::iter::repeat(0.0).take(left));
    padded.extend_from_slice(signal);
    padded.extend(std::iter::repeat(0.0).take(right));

    let length = window as f64;
    Ok(window_sums(&padded, window)
        .into_iter()
        .map(|sum| sum / length)
        .collect())
}

/// Sliding-window root mean square, `len - window + 1` outputs
pub fn sliding_rms(signal: &[f64], window: usize) -> EmgResult<Vec<f64>> {
    check_window(ProcessingStage::Rms, window, signal.len())?;

    let squares: Vec<f64> = signal.iter().map(|x| x * x).collect();
    let length = window as f64;
    Ok(window_sums(&squares, window)
        .into_iter()
        .map(|sum| (sum / length).max(0.0).sqrt())
        .collect())
}

fn check_window(stage: ProcessingStage, window: usize, available: usize) -> EmgResult<()> {
    if window == 0 {
        return Err(EmgError::configuration(
            "envelope",
            format!("{} window must be at least one sample", stage),
        ));
    }
    if window > available {
        return Err(EmgError::WindowTooLarge {
            stage,
            window,
            available,
        });
    }
    Ok(())
}

/// Sums of every length-`window` run of `values`, `values.len() - window + 1` outputs
fn window_sums(values: &[f64], window: usize) -> Vec<f64> {
    let count = values.len() + 1 - window;
    let mut sums = Vec::with_capacity(count);
    let mut running = 0.0;

    for i in 0..count {
        if i % window == 0 {
            running = values[i..i + window].iter().sum();
        } else {
            running += values[i + window - 1] - values[i - 1];
        }
        sums.push(running);
    }

    sums
}

/// Envelope values plus how they line up with the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub values: Vec<f64>,
    pub method: EnvelopeMethod,
    pub window_samples: usize,
    /// Index of the input sample aligned with `values[0]`
    pub offset: usize,
}

impl Envelope {
    /// The part of the input's time axis aligned with the envelope
    pub fn aligned_axis<'a>(&self, input_axis: &'a [f64]) -> &'a [f64] {
        let start = self.offset.min(input_axis.len());
        let end = (start + self.values.len()).min(input_axis.len());
        &input_axis[start..end]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Envelope extractor configured for one method and window
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeExtractor {
    method: EnvelopeMethod,
    window_samples: usize,
}

impl EnvelopeExtractor {
    pub fn new(method: EnvelopeMethod, window_samples: usize) -> Self {
        Self {
            method,
            window_samples,
        }
    }

    /// Build from configuration, resolving the RMS window at `sample_rate_hz`
    pub fn from_config(config: &EnvelopeConfig, sample_rate_hz: u32) -> Self {
        Self::new(config.method, config.window_samples(sample_rate_hz))
    }

    pub fn method(&self) -> EnvelopeMethod {
        self.method
    }

    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    /// Envelope of an already rectified signal
    pub fn extract(&self, rectified: &[f64]) -> EmgResult<Envelope> {
        let (values, offset) = match self.method {
            EnvelopeMethod::Smoothing => (moving_average(rectified, self.window_samples)?, 0),
            EnvelopeMethod::Rms => (
                sliding_rms(rectified, self.window_samples)?,
                self.window_samples - 1,
            ),
        };

        debug!(
            method = ?self.method,
            window = self.window_samples,
            input = rectified.len(),
            output = values.len(),
            "extracted envelope"
        );

        Ok(Envelope {
            values,
            method: self.method,
            window_samples: self.window_samples,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn direct_same_average(signal: &[f64], window: usize) -> Vec<f64> {
        let right = (window - 1) / 2;
        let left = window - 1 - right;
        (0..signal.len())
            .map(|i| {
                let lo = i.saturating_sub(left);
                let hi = (i + right).min(signal.len() - 1);
                signal[lo..=hi].iter().sum::<f64>() / window as f64
            })
            .collect()
    }

    #[test]
    fn test_rectify() {
        assert_eq!(rectify(&[-1.5, 0.0, 2.0]), vec![1.5, 0.0, 2.0]);
    }

    #[test]
    fn test_moving_average_edges_attenuated() {
        let smoothed = moving_average(&[1.0; 7], 3).unwrap();
        let third = 1.0 / 3.0;
        assert_eq!(smoothed.len(), 7);
        assert!((smoothed[0] - 2.0 * third).abs() < 1e-12);
        assert!((smoothed[3] - 1.0).abs() < 1e-12);
        assert!((smoothed[6] - 2.0 * third).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_impulse_is_centered() {
        let mut signal = vec![0.0; 9];
        signal[4] = 5.0;
        let smoothed = moving_average(&signal, 5).unwrap();
        assert_eq!(smoothed, vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_moving_average_even_window() {
        // same-mode convolution with kernel length 4 reaches 2 back and 1 ahead
        let smoothed = moving_average(&[0.0, 0.0, 4.0, 0.0, 0.0, 0.0], 4).unwrap();
        assert_eq!(smoothed, vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_window_equal_to_length() {
        let smoothed = moving_average(&[3.0, 3.0, 3.0], 3).unwrap();
        assert_eq!(smoothed.len(), 3);
        let rms = sliding_rms(&[3.0, 4.0], 2).unwrap();
        assert_eq!(rms.len(), 1);
        assert!((rms[0] - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_window_too_large() {
        match sliding_rms(&[1.0; 10], 11) {
            Err(EmgError::WindowTooLarge { stage, window, available }) => {
                assert_eq!(stage, ProcessingStage::Rms);
                assert_eq!(window, 11);
                assert_eq!(available, 10);
            }
            other => panic!("Expected WindowTooLarge, got {:?}", other),
        }
        assert!(matches!(
            moving_average(&[1.0; 10], 501),
            Err(EmgError::WindowTooLarge { .. })
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            moving_average(&[1.0; 10], 0),
            Err(EmgError::Configuration { .. })
        ));
    }

    #[test]
    fn test_rms_known_values() {
        let rms = sliding_rms(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        let expected = [2.5f64.sqrt(), 6.5f64.sqrt(), 12.5f64.sqrt()];
        for (got, want) in rms.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_extractor_offsets() {
        let signal = vec![1.0; 100];
        let axis: Vec<f64> = (0..100).map(|i| i as f64).collect();

        let rms = EnvelopeExtractor::new(EnvelopeMethod::Rms, 10).extract(&signal).unwrap();
        assert_eq!(rms.len(), 91);
        assert_eq!(rms.offset, 9);
        assert_eq!(rms.aligned_axis(&axis)[0], 9.0);
        assert_eq!(rms.aligned_axis(&axis).len(), 91);

        let smooth = EnvelopeExtractor::new(EnvelopeMethod::Smoothing, 11).extract(&signal).unwrap();
        assert_eq!(smooth.len(), 100);
        assert_eq!(smooth.aligned_axis(&axis), &axis[..]);
    }

    #[test]
    fn test_extractor_from_config() {
        let config = EnvelopeConfig {
            method: EnvelopeMethod::Rms,
            rms_window_ms: 50.0,
            ..Default::default()
        };
        let extractor = EnvelopeExtractor::from_config(&config, 2000);
        assert_eq!(extractor.window_samples(), 100);
        assert_eq!(extractor.method(), EnvelopeMethod::Rms);
    }

    proptest! {
        #[test]
        fn prop_rms_of_constant_is_constant(c in 0.0f64..40_000.0, len in 1usize..400, w in 1usize..400) {
            prop_assume!(w <= len);
            let rms = sliding_rms(&vec![c; len], w).unwrap();
            prop_assert_eq!(rms.len(), len - w + 1);
            for v in rms {
                prop_assert!((v - c).abs() <= 1e-9 * c.max(1.0));
            }
        }

        #[test]
        fn prop_moving_average_matches_direct_sum(
            signal in proptest::collection::vec(0.0f64..1000.0, 1..300),
            w in 1usize..300,
        ) {
            prop_assume!(w <= signal.len());
            let fast = moving_average(&signal, w).unwrap();
            let direct = direct_same_average(&signal, w);
            prop_assert_eq!(fast.len(), direct.len());
            for (a, b) in fast.iter().zip(direct.iter()) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }
    }
}
