// src/processing/mod.rs
//! Batch signal conditioning and segmentation stages

pub mod bandpass;
pub mod envelope;
pub mod epochs;
pub mod pipeline;
pub mod threshold;
pub mod time_axis;
pub mod trimmer;

pub use bandpass::ButterworthBandpass;
pub use envelope::{moving_average, rectify, sliding_rms, Envelope, EnvelopeExtractor};
pub use epochs::{boundaries_from_config, epoch_boundaries};
pub use pipeline::AnalysisPipeline;
pub use threshold::{Crossings, ThresholdDetector};
pub use time_axis::{linspace, time_axis};
pub use trimmer::{EpochTrimmer, TrimmedEpoch};
