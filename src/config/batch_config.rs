// src/config/batch_config.rs
//! Batch run configuration: which sessions to analyse and where their files live

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::constants::paths;
use super::{defaults, AnalysisConfig};

/// One recording session, identified by recording date and subject code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSpec {
    pub date: String,
    pub subject: String,
}

impl SessionSpec {
    pub fn new(date: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            subject: subject.into(),
        }
    }

    /// Substitute `{date}` and `{subject}` in a path template
    pub fn render(&self, template: &str) -> String {
        template
            .replace(paths::DATE_PLACEHOLDER, &self.date)
            .replace(paths::SUBJECT_PLACEHOLDER, &self.subject)
    }
}

impl std::fmt::Display for SessionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.date, self.subject)
    }
}

/// Batch driver configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BatchConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub sessions: Vec<SessionSpec>,

    #[serde(default = "defaults::recording_template")]
    pub recording_template: String,

    #[serde(default = "defaults::events_template")]
    pub events_template: String,

    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Recording channel kept from multi-channel files
    #[serde(default = "defaults::channel")]
    pub channel: usize,

    /// Run sessions on the rayon thread pool
    #[serde(default = "defaults::parallel")]
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            sessions: Vec::new(),
            recording_template: defaults::recording_template(),
            events_template: defaults::events_template(),
            output_dir: defaults::output_dir(),
            channel: defaults::channel(),
            parallel: defaults::parallel(),
        }
    }
}

impl BatchConfig {
    /// Cartesian product of dates and subjects, date-major
    pub fn sessions_from_lists<D, S>(dates: &[D], subjects: &[S]) -> Vec<SessionSpec>
    where
        D: AsRef<str>,
        S: AsRef<str>,
    {
        dates
            .iter()
            .flat_map(|date| {
                subjects
                    .iter()
                    .map(move |subject| SessionSpec::new(date.as_ref(), subject.as_ref()))
            })
            .collect()
    }

    pub fn recording_path(&self, session: &SessionSpec) -> PathBuf {
        PathBuf::from(session.render(&self.recording_template))
    }

    pub fn events_path(&self, session: &SessionSpec) -> PathBuf {
        PathBuf::from(session.render(&self.events_template))
    }

    pub fn report_path(&self, session: &SessionSpec) -> PathBuf {
        self.output_dir
            .join(session.render(paths::REPORT_STEM_TEMPLATE))
            .with_extension("json")
    }

    /// Validate batch-level values and the embedded analysis configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.analysis.validate().err().unwrap_or_default();

        for (name, template) in [
            ("recording_template", &self.recording_template),
            ("events_template", &self.events_template),
        ] {
            if template.trim().is_empty() {
                errors.push(format!("{} must not be empty", name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
