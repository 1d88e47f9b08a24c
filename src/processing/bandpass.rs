// src/processing/bandpass.rs
//! Zero-phase Butterworth band-pass pre-filter
//!
//! A Butterworth high-pass and low-pass of the same order are built from
//! second-order sections (bilinear transform with pre-warping) and run over
//! the signal forward then backward. The signal is extended at both ends by
//! odd reflection and every section starts from its steady state for the
//! first sample, which keeps edge transients small.

use std::f64::consts::PI;

use tracing::debug;

use crate::config::{constants::filter, BandpassConfig};
use crate::error::{EmgError, EmgResult};

/// Normalized second-order section coefficients (`a0 == 1`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl BiquadCoefficients {
    fn lowpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 + k / q + k2;
        let b0 = k2 / norm;
        Self {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (k2 - 1.0) / norm, (1.0 - k / q + k2) / norm],
        }
    }

    fn highpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 + k / q + k2;
        Self {
            b: [1.0 / norm, -2.0 / norm, 1.0 / norm],
            a: [2.0 * (k2 - 1.0) / norm, (1.0 - k / q + k2) / norm],
        }
    }

    /// Gain at DC
    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }
}

/// Transposed direct form II section state
#[derive(Debug, Clone, Copy)]
struct Biquad {
    coefficients: BiquadCoefficients,
    s1: f64,
    s2: f64,
}

impl Biquad {
    /// Section settled on a constant input `x`
    fn settled(coefficients: BiquadCoefficients, x: f64) -> (Self, f64) {
        let [_, b1, b2] = coefficients.b;
        let [a1, a2] = coefficients.a;
        let y = coefficients.dc_gain() * x;
        let s2 = b2 * x - a2 * y;
        let s1 = b1 * x - a1 * y + s2;
        (Self { coefficients, s1, s2 }, y)
    }

    fn process_sample(&mut self, x: f64) -> f64 {
        let [b0, b1, b2] = self.coefficients.b;
        let [a1, a2] = self.coefficients.a;
        let y = b0 * x + self.s1;
        self.s1 = b1 * x - a1 * y + self.s2;
        self.s2 = b2 * x - a2 * y;
        y
    }
}

/// Butterworth band-pass as a cascade of second-order sections
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthBandpass {
    sections: Vec<BiquadCoefficients>,
    low_cut_hz: f64,
    high_cut_hz: f64,
}

impl ButterworthBandpass {
    /// Band-pass with `order`-th order edges at `low_cut_hz` and `high_cut_hz`
    pub fn new(order: usize, low_cut_hz: f64, high_cut_hz: f64, sample_rate_hz: u32) -> EmgResult<Self> {
        if order < filter::MIN_ORDER || order > filter::MAX_ORDER || order % 2 != 0 {
            return Err(EmgError::configuration(
                "bandpass",
                format!(
                    "order must be even and within {}..={}, got {}",
                    filter::MIN_ORDER,
                    filter::MAX_ORDER,
                    order
                ),
            ));
        }
        let nyquist = sample_rate_hz as f64 / 2.0;
        if !(low_cut_hz > 0.0 && low_cut_hz < high_cut_hz && high_cut_hz < nyquist) {
            return Err(EmgError::configuration(
                "bandpass",
                format!(
                    "band [{}, {}] Hz must satisfy 0 < low < high < Nyquist ({} Hz)",
                    low_cut_hz, high_cut_hz, nyquist
                ),
            ));
        }

        let fs = sample_rate_hz as f64;
        // Pre-warp frequencies for the bilinear transform
        let k_low = (PI * low_cut_hz / fs).tan();
        let k_high = (PI * high_cut_hz / fs).tan();

        let q_factors = Self::butterworth_q_factors(order);
        let sections = q_factors
            .iter()
            .map(|&q| BiquadCoefficients::highpass(k_low, q))
            .chain(q_factors.iter().map(|&q| BiquadCoefficients::lowpass(k_high, q)))
            .collect();

        Ok(Self {
            sections,
            low_cut_hz,
            high_cut_hz,
        })
    }

    pub fn from_config(config: &BandpassConfig, sample_rate_hz: u32) -> EmgResult<Self> {
        Self::new(config.order, config.low_cut_hz, config.high_cut_hz, sample_rate_hz)
    }

    pub fn sections(&self) -> &[BiquadCoefficients] {
        &self.sections
    }

    /// Q of each conjugate pole pair of an `order`-th order Butterworth prototype
    fn butterworth_q_factors(order: usize) -> Vec<f64> {
        (0..order / 2)
            .map(|k| {
                let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
                1.0 / (2.0 * theta.cos())
            })
            .collect()
    }

    /// Zero-phase forward-backward filtering
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let desired = filter::PAD_FACTOR * (2 * self.sections.len() + 1);
        let pad = desired.min(n - 1);

        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        let forward = self.run_cascade(&extended);
        let mut backward: Vec<f64> = forward.into_iter().rev().collect();
        backward = self.run_cascade(&backward);
        backward.reverse();

        debug!(
            low_cut_hz = self.low_cut_hz,
            high_cut_hz = self.high_cut_hz,
            sections = self.sections.len(),
            samples = n,
            pad,
            "band-pass filtered"
        );

        backward[pad..pad + n].to_vec()
    }

    fn run_cascade(&self, input: &[f64]) -> Vec<f64> {
        let mut output = input.to_vec();
        let Some(&x0) = input.first() else {
            return output;
        };

        let mut settle_input = x0;
        for coefficients in &self.sections {
            let (mut section, settled_output) = Biquad::settled(*coefficients, settle_input);
            settle_input = settled_output;
            for sample in output.iter_mut() {
                *sample = section.process_sample(*sample);
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, sample_rate_hz: u32, count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / sample_rate_hz as f64).sin())
            .collect()
    }

    #[test]
    fn test_section_count() {
        let filter = ButterworthBandpass::new(4, 20.0, 450.0, 1000).unwrap();
        assert_eq!(filter.sections().len(), 4);
    }

    #[test]
    fn test_second_order_q_is_butterworth() {
        let q = ButterworthBandpass::butterworth_q_factors(2);
        assert!((q[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(ButterworthBandpass::new(3, 20.0, 450.0, 1000).is_err());
        assert!(ButterworthBandpass::new(10, 20.0, 450.0, 1000).is_err());
        assert!(ButterworthBandpass::new(4, 20.0, 600.0, 1000).is_err());
        assert!(ButterworthBandpass::new(4, 0.0, 450.0, 1000).is_err());
        assert!(ButterworthBandpass::new(4, 300.0, 200.0, 1000).is_err());
    }

    #[test]
    fn test_dc_removed() {
        let filter = ButterworthBandpass::new(4, 20.0, 450.0, 1000).unwrap();
        let output = filter.filtfilt(&vec![5.0; 500]);
        assert_eq!(output.len(), 500);
        assert!(output.iter().all(|x| x.abs() < 1e-6));
    }

    #[test]
    fn test_passband_preserved_without_phase_shift() {
        let filter = ButterworthBandpass::new(4, 20.0, 450.0, 1000).unwrap();
        let input = sine(100.0, 1000, 1000);
        let output = filter.filtfilt(&input);

        for i in 200..800 {
            assert!((output[i] - input[i]).abs() < 0.02, "sample {} differs", i);
        }
    }

    #[test]
    fn test_stopband_attenuated() {
        let filter = ButterworthBandpass::new(4, 20.0, 450.0, 1000).unwrap();
        let output = filter.filtfilt(&sine(2.0, 1000, 4000));

        let peak = output[1000..3000].iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        assert!(peak < 0.01, "2 Hz peak {} not attenuated", peak);
    }

    #[test]
    fn test_short_signals() {
        let filter = ButterworthBandpass::new(2, 20.0, 450.0, 1000).unwrap();
        assert!(filter.filtfilt(&[]).is_empty());
        assert_eq!(filter.filtfilt(&[1.0]).len(), 1);
        assert_eq!(filter.filtfilt(&[1.0, -1.0, 2.0]).len(), 3);
    }
}
