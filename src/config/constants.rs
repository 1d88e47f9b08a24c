// src/config/constants.rs
//! Analysis-wide constants and defaults

/// Event log and anchor constants
pub mod events {
    /// Marker id of the task-onset event
    pub const DEFAULT_ANCHOR_EVENT_ID: &str = "2";
    pub const COMMENT_PREFIX: char = '#';
    pub const FIELD_DELIMITER: char = ',';
}

/// Epoch segmentation constants
pub mod epoch {
    pub const DEFAULT_PRE_ROLL_S: f64 = 10.0;
    pub const DEFAULT_TASK_WINDOW_S: f64 = 60.0;
    pub const DEFAULT_SUB_EPOCH_LENGTH_S: f64 = 10.0;
    /// Baseline plus five on/off cycles
    pub const DEFAULT_SUB_EPOCH_COUNT: usize = 6;
    pub const ANCHOR_TOLERANCE_S: f64 = 1e-9;
}

/// Envelope extraction constants
pub mod envelope {
    pub const DEFAULT_SMOOTHING_WINDOW_SAMPLES: usize = 501;
    pub const DEFAULT_RMS_WINDOW_MS: f64 = 100.0;
    pub const MILLISECONDS_PER_SECOND: f64 = 1000.0;
}

/// Threshold detection constants
pub mod threshold {
    pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.05;
}

/// Band-pass pre-filter constants
pub mod filter {
    pub const DEFAULT_LOW_CUT_HZ: f64 = 20.0;
    pub const DEFAULT_HIGH_CUT_HZ: f64 = 450.0;
    pub const DEFAULT_ORDER: usize = 4;
    pub const MIN_ORDER: usize = 2;
    pub const MAX_ORDER: usize = 8;
    /// Edge padding, in multiples of the cascade length, for zero-phase filtering
    pub const PAD_FACTOR: usize = 3;
}

/// Batch driver and file layout constants
pub mod paths {
    pub const DEFAULT_RECORDING_TEMPLATE: &str = "data/on_off_10sec/on_off_10s_{date}_{subject}.wav";
    pub const DEFAULT_EVENTS_TEMPLATE: &str = "data/on_off_10sec/on_off_10s_{date}_{subject}_events.txt";
    pub const DEFAULT_OUTPUT_DIR: &str = "figures";
    pub const REPORT_STEM_TEMPLATE: &str = "on_off_10s_{date}_{subject}";
    pub const DATE_PLACEHOLDER: &str = "{date}";
    pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

    pub const DEFAULT_CONFIG_FILE: &str = "emg-epoch.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const ENV_PREFIX: &str = "EMG_EPOCH_";
}
