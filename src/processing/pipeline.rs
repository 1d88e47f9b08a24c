// src/processing/pipeline.rs
//! Single-recording analysis pipeline
//!
//! Stages run strictly in order: anchor lookup, trimming, optional band-pass,
//! rectification, envelope extraction, then threshold detection on both the
//! signal and its envelope. Sub-epoch boundaries are derived from the
//! re-anchored event alongside.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{EmgError, EmgResult};
use crate::events::EventLog;
use crate::processing::bandpass::ButterworthBandpass;
use crate::processing::envelope::{rectify, EnvelopeExtractor};
use crate::processing::epochs::boundaries_from_config;
use crate::processing::threshold::ThresholdDetector;
use crate::processing::trimmer::EpochTrimmer;
use crate::recording::Recording;
use crate::report::{AnalysisReport, ReportMetadata};

/// Stateless analysis pipeline; one `run` per recording
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> EmgResult<Self> {
        config
            .validate()
            .map_err(|errors| EmgError::configuration("analysis", errors.join("; ")))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse one recording against its event log
    pub fn run(&self, recording: &Recording, events: &EventLog) -> EmgResult<AnalysisReport> {
        let started = Instant::now();
        let config = &self.config;
        let sample_rate_hz = recording.sample_rate_hz();

        config
            .validate_consistency(sample_rate_hz)
            .map_err(|errors| EmgError::configuration("analysis", errors.join("; ")))?;

        let source_anchor_s = events.anchor_time(&config.anchor_event_id)?;
        debug!(anchor_event_id = %config.anchor_event_id, source_anchor_s, "found anchor event");

        let trimmed = EpochTrimmer::new(&config.epoch).trim_recording(recording, source_anchor_s)?;

        let signal = if config.bandpass.enabled {
            ButterworthBandpass::from_config(&config.bandpass, sample_rate_hz)?.filtfilt(&trimmed.samples)
        } else {
            trimmed.samples.clone()
        };

        let extractor = EnvelopeExtractor::from_config(&config.envelope, sample_rate_hz);
        let envelope = extractor.extract(&rectify(&signal))?;
        let envelope_time_axis = envelope.aligned_axis(&trimmed.time_axis).to_vec();

        let raw_crossings = ThresholdDetector::raw_from_config(&config.threshold).detect(&signal);
        let envelope_crossings =
            ThresholdDetector::envelope_from_config(&config.threshold).detect(&envelope.values);

        let epoch_boundaries = boundaries_from_config(trimmed.anchor_s, &config.epoch);

        info!(
            samples = signal.len(),
            raw_threshold = raw_crossings.threshold,
            raw_crossings = raw_crossings.count,
            envelope_threshold = envelope_crossings.threshold,
            envelope_crossings = envelope_crossings.count,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "analysed recording"
        );

        Ok(AnalysisReport {
            metadata: ReportMetadata {
                sample_rate_hz,
                anchor_event_id: config.anchor_event_id.clone(),
                source_anchor_s,
                anchor_s: trimmed.anchor_s,
                source_start_index: trimmed.source_start_index,
                clipped_start: trimmed.clipped_start,
                clipped_end: trimmed.clipped_end,
                envelope_method: envelope.method,
                envelope_window_samples: envelope.window_samples,
                bandpass_enabled: config.bandpass.enabled,
            },
            time_axis: trimmed.time_axis,
            signal,
            envelope: envelope.values,
            envelope_time_axis,
            raw_crossings,
            envelope_crossings,
            epoch_boundaries,
        })
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }
}
