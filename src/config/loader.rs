// src/config/loader.rs
//! Layered configuration loader
//!
//! Built-in defaults are serialized to a TOML tree, each existing config file
//! is merged on top in order, then `EMG_EPOCH_*` environment variables are
//! applied. Nested keys are separated by a double underscore, e.g.
//! `EMG_EPOCH_ENVELOPE__RMS_WINDOW_MS=50` sets `envelope.rms_window_ms`.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{constants::paths, AnalysisConfig, BatchConfig};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Configuration loader merging defaults, files and environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader over the default search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader with custom paths, later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load and validate the analysis configuration
    pub fn load_analysis_config(&self) -> Result<AnalysisConfig, ConfigError> {
        let config: AnalysisConfig = self.load_and_merge_configs()?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Load and validate a batch configuration
    pub fn load_batch_config(&self) -> Result<BatchConfig, ConfigError> {
        let config: BatchConfig = self.load_and_merge_configs()?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Export a configuration as pretty TOML
    pub fn export_config<T: Serialize, P: AsRef<Path>>(config: &T, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_and_merge_configs<T>(&self) -> Result<T, ConfigError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut merged_config = toml::Value::try_from(T::default())?;

        for config_path in &self.config_paths {
            if !config_path.exists() {
                continue;
            }
            debug!(path = %config_path.display(), "merging configuration file");
            let file_config = Self::load_config_file(config_path)?;
            Self::merge_toml_values(&mut merged_config, file_config);
        }

        self.apply_environment_overrides(&mut merged_config);

        merged_config
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))
    }

    fn load_config_file<P: AsRef<Path>>(path: P) -> Result<toml::Value, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;

        Ok(config)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(stripped) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let config_key: Vec<String> = stripped
                .split("__")
                .map(|part| part.to_lowercase())
                .collect();
            if config_key.iter().any(|part| part.is_empty()) {
                continue;
            }
            debug!(variable = %key, "applying environment override");
            Self::set_nested_value(config, &config_key, &value);
        }
    }

    fn parse_env_value(value: &str) -> toml::Value {
        if let Ok(int_val) = value.parse::<i64>() {
            toml::Value::Integer(int_val)
        } else if let Ok(float_val) = value.parse::<f64>() {
            toml::Value::Float(float_val)
        } else if let Ok(bool_val) = value.parse::<bool>() {
            toml::Value::Boolean(bool_val)
        } else {
            toml::Value::String(value.to_string())
        }
    }

    fn set_nested_value(config: &mut toml::Value, path: &[String], raw: &str) {
        let Some((leaf, parents)) = path.split_last() else {
            return;
        };

        let mut current = config;
        for part in parents {
            let toml::Value::Table(table) = current else {
                return;
            };
            current = table
                .entry(part.clone())
                .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
        }

        if let toml::Value::Table(table) = current {
            // String fields stay strings even when the value looks numeric
            let value = match table.get(leaf) {
                Some(toml::Value::String(_)) => toml::Value::String(raw.to_string()),
                Some(toml::Value::Float(_)) => raw
                    .parse::<f64>()
                    .map(toml::Value::Float)
                    .unwrap_or_else(|_| Self::parse_env_value(raw)),
                _ => Self::parse_env_value(raw),
            };
            table.insert(leaf.clone(), value);
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvelopeMethod;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_config_loader_creation() {
        let loader = ConfigLoader::new();
        assert!(!loader.config_paths().is_empty());
    }

    #[test]
    #[serial]
    fn test_missing_files_yield_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("does/not/exist.toml")]);
        let config = loader.load_analysis_config().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    #[serial]
    fn test_later_files_take_precedence() {
        let base = write_config(
            r#"
anchor_event_id = "3"

[envelope]
method = "rms"
rms_window_ms = 50.0
"#,
        );
        let local = write_config(
            r#"
[envelope]
rms_window_ms = 25.0
"#,
        );

        let loader = ConfigLoader::with_paths(vec![base.path().into(), local.path().into()]);
        let config = loader.load_analysis_config().unwrap();

        assert_eq!(config.anchor_event_id, "3");
        assert_eq!(config.envelope.method, EnvelopeMethod::Rms);
        assert_eq!(config.envelope.rms_window_ms, 25.0);
    }

    #[test]
    #[serial]
    fn test_invalid_config_rejected() {
        let file = write_config(
            r#"
[threshold]
fraction = 1.5
"#,
        );

        let loader = ConfigLoader::with_paths(vec![file.path().into()]);
        match loader.load_analysis_config() {
            Err(ConfigError::ValidationError(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_malformed_toml_rejected() {
        let file = write_config("[envelope\nmethod = ");
        let loader = ConfigLoader::with_paths(vec![file.path().into()]);
        assert!(matches!(
            loader.load_analysis_config(),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        std::env::set_var("EMG_EPOCH_TEST_ENVELOPE__SMOOTHING_WINDOW_SAMPLES", "301");
        std::env::set_var("EMG_EPOCH_TEST_ANCHOR_EVENT_ID", "7");
        std::env::set_var("EMG_EPOCH_TEST_EPOCH__PRE_ROLL_S", "5");

        let loader = ConfigLoader::with_paths(vec![]).with_env_prefix("EMG_EPOCH_TEST_");
        let config = loader.load_analysis_config().unwrap();

        assert_eq!(config.envelope.smoothing_window_samples, 301);
        assert_eq!(config.anchor_event_id, "7");
        assert_eq!(config.epoch.pre_roll_s, 5.0);

        std::env::remove_var("EMG_EPOCH_TEST_ENVELOPE__SMOOTHING_WINDOW_SAMPLES");
        std::env::remove_var("EMG_EPOCH_TEST_ANCHOR_EVENT_ID");
        std::env::remove_var("EMG_EPOCH_TEST_EPOCH__PRE_ROLL_S");
    }

    #[test]
    #[serial]
    fn test_batch_config_loading() {
        let file = write_config(
            r#"
recording_template = "rec/{date}_{subject}.wav"

[[sessions]]
date = "250110"
subject = "SM"
"#,
        );

        let loader = ConfigLoader::with_paths(vec![file.path().into()]);
        let config = loader.load_batch_config().unwrap();

        assert_eq!(config.sessions.len(), 1);
        assert_eq!(config.recording_template, "rec/{date}_{subject}.wav");
    }

    #[test]
    fn test_config_export() {
        let temp_file = NamedTempFile::new().unwrap();

        ConfigLoader::export_config(&AnalysisConfig::default(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[envelope]"));
        assert!(content.contains("smoothing_window_samples = 501"));
    }
}
