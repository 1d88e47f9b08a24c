// src/recording.rs
//! Decoded mono recordings and the decoder seam
//!
//! The pipeline never touches codecs. A [`SampleSource`] turns a file into a
//! [`Recording`]; [`WavSource`] is the stock implementation for WAV files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EmgError, EmgResult};

/// Mono sample sequence at a fixed sample rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    samples: Vec<f64>,
    sample_rate_hz: u32,
}

impl Recording {
    /// Wrap decoded samples, rejecting empty, non-finite or zero-rate input
    pub fn new(samples: Vec<f64>, sample_rate_hz: u32) -> EmgResult<Self> {
        if sample_rate_hz == 0 {
            return Err(EmgError::invalid_data("recording", "sample rate must be > 0"));
        }
        if samples.is_empty() {
            return Err(EmgError::invalid_data("recording", "sample sequence is empty"));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(EmgError::invalid_data(
                "recording",
                format!("non-finite sample at index {}", index),
            ));
        }

        Ok(Self {
            samples,
            sample_rate_hz,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, `len / sample_rate`
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }
}

/// Decoder collaborator producing a mono recording from a file
pub trait SampleSource: Send + Sync {
    fn load(&self, path: &Path) -> EmgResult<Recording>;
}

/// WAV decoder keeping one channel of the file
#[cfg(feature = "wav")]
#[derive(Debug, Clone, Default)]
pub struct WavSource {
    channel: usize,
}

#[cfg(feature = "wav")]
impl WavSource {
    /// Keep `channel` (0 is the left channel) of multi-channel files
    pub fn new(channel: usize) -> Self {
        Self { channel }
    }

    fn decode_error(path: &Path, err: impl std::fmt::Display) -> EmgError {
        EmgError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

#[cfg(feature = "wav")]
impl SampleSource for WavSource {
    fn load(&self, path: &Path) -> EmgResult<Recording> {
        use hound::{SampleFormat, WavReader};

        let mut reader = WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(io) => EmgError::io(path, io),
            other => Self::decode_error(path, other),
        })?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        if self.channel >= channels {
            return Err(Self::decode_error(
                path,
                format!("channel {} requested but file has {} channel(s)", self.channel, channels),
            ));
        }

        // Raw integer amplitudes are kept unscaled
        let interleaved: Vec<f64> = match spec.sample_format {
            SampleFormat::Int => reader
                .samples::<i32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<_, _>>()
                .map_err(|e| Self::decode_error(path, e))?,
            SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<_, _>>()
                .map_err(|e| Self::decode_error(path, e))?,
        };

        let samples: Vec<f64> = interleaved
            .into_iter()
            .skip(self.channel)
            .step_by(channels)
            .collect();

        tracing::debug!(
            path = %path.display(),
            sample_rate_hz = spec.sample_rate,
            channels,
            samples = samples.len(),
            "decoded recording"
        );

        Recording::new(samples, spec.sample_rate)
            .map_err(|e| Self::decode_error(path, e))
    }
}
