// src/batch.rs
//! Batch driver over (date, subject) sessions
//!
//! Each session maps to one independent pipeline run. Sessions share no
//! state, so they may run on the rayon pool. A session whose recording is
//! missing is skipped; a session that fails is logged and the batch carries on.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::config::{BatchConfig, SessionSpec};
use crate::error::{EmgError, EmgResult};
use crate::events::EventLog;
use crate::processing::AnalysisPipeline;
use crate::recording::SampleSource;
use crate::report::AnalysisReport;

/// What happened to one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionStatus {
    Completed {
        report_path: PathBuf,
        raw_crossings: usize,
        envelope_crossings: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session: SessionSpec,
    #[serde(flatten)]
    pub status: SessionStatus,
}

/// Outcomes of a batch run, in session order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub outcomes: Vec<SessionOutcome>,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.count(|status| matches!(status, SessionStatus::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, SessionStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, SessionStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&SessionStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

/// Runs the analysis pipeline for every configured session
pub struct BatchRunner {
    config: BatchConfig,
    pipeline: AnalysisPipeline,
    source: Arc<dyn SampleSource>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig, source: Arc<dyn SampleSource>) -> EmgResult<Self> {
        config
            .validate()
            .map_err(|errors| EmgError::configuration("batch", errors.join("; ")))?;
        let pipeline = AnalysisPipeline::new(config.analysis.clone())?;

        Ok(Self {
            config,
            pipeline,
            source,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run every session, sequentially or on the rayon pool
    pub fn run(&self) -> BatchSummary {
        let sessions = &self.config.sessions;
        info!(sessions = sessions.len(), parallel = self.config.parallel, "starting batch");

        let outcomes: Vec<SessionOutcome> = if self.config.parallel {
            sessions.par_iter().map(|session| self.process(session)).collect()
        } else {
            sessions.iter().map(|session| self.process(session)).collect()
        };

        let summary = BatchSummary { outcomes };
        info!(
            completed = summary.completed(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "batch finished"
        );
        summary
    }

    /// Analyse one session without writing anything
    ///
    /// Returns `Ok(None)` when the session's recording does not exist.
    pub fn analyze_session(&self, session: &SessionSpec) -> EmgResult<Option<AnalysisReport>> {
        let recording_path = self.config.recording_path(session);
        if !recording_path.is_file() {
            return Ok(None);
        }

        let recording = self.source.load(&recording_path)?;
        let events = EventLog::from_file(self.config.events_path(session))?;
        self.pipeline.run(&recording, &events).map(Some)
    }

    fn process(&self, session: &SessionSpec) -> SessionOutcome {
        let _span = info_span!("session", %session).entered();

        let status = match self.analyze_session(session) {
            Ok(Some(report)) => {
                let report_path = self.config.report_path(session);
                match report.write_json(&report_path) {
                    Ok(()) => {
                        info!(path = %report_path.display(), "wrote report");
                        SessionStatus::Completed {
                            report_path,
                            raw_crossings: report.raw_crossings.count,
                            envelope_crossings: report.envelope_crossings.count,
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "session failed");
                        SessionStatus::Failed {
                            error: err.to_string(),
                        }
                    }
                }
            }
            Ok(None) => {
                let path = self.config.recording_path(session);
                info!(path = %path.display(), "recording not found, skipping session");
                SessionStatus::Skipped {
                    reason: format!("recording {} not found", path.display()),
                }
            }
            Err(err) => {
                warn!(error = %err, "session failed");
                SessionStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        SessionOutcome {
            session: session.clone(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::Recording;
    use std::path::Path;

    /// Source that ignores file contents and returns a fixed burst
    struct FixedSource;

    impl SampleSource for FixedSource {
        fn load(&self, _path: &Path) -> EmgResult<Recording> {
            let mut samples = vec![0.0; 1000];
            samples[500..=510].fill(1.0);
            Recording::new(samples, 1000)
        }
    }

    fn batch_in(dir: &Path, parallel: bool) -> BatchConfig {
        let mut config = BatchConfig {
            recording_template: dir.join("{date}_{subject}.wav").display().to_string(),
            events_template: dir.join("{date}_{subject}_events.txt").display().to_string(),
            output_dir: dir.join("out"),
            sessions: vec![
                SessionSpec::new("250110", "AM"),
                SessionSpec::new("250110", "GS"),
                SessionSpec::new("250117", "PA"),
            ],
            parallel,
            ..Default::default()
        };
        config.analysis.envelope.smoothing_window_samples = 11;
        config
    }

    fn setup(dir: &Path) {
        // AM: complete session
        std::fs::write(dir.join("250110_AM.wav"), b"").unwrap();
        std::fs::write(dir.join("250110_AM_events.txt"), "2,0.5\n").unwrap();
        // GS: recording present but no anchor
        std::fs::write(dir.join("250110_GS.wav"), b"").unwrap();
        std::fs::write(dir.join("250110_GS_events.txt"), "1,0.5\n").unwrap();
        // PA: no recording at all
    }

    fn check(summary: &BatchSummary, dir: &Path) {
        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);

        assert_eq!(summary.outcomes[0].session, SessionSpec::new("250110", "AM"));
        match &summary.outcomes[0].status {
            SessionStatus::Completed { report_path, raw_crossings, .. } => {
                assert_eq!(*raw_crossings, 11);
                assert_eq!(report_path, &dir.join("out").join("on_off_10s_250110_AM.json"));
                let report = AnalysisReport::read_json(report_path).unwrap();
                assert_eq!(report.epoch_boundaries.len(), 6);
            }
            other => panic!("Expected completed session, got {:?}", other),
        }
        match &summary.outcomes[1].status {
            SessionStatus::Failed { error } => assert!(error.contains("ANCHOR")),
            other => panic!("Expected failed session, got {:?}", other),
        }
    }

    #[test]
    fn test_sequential_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        setup(dir.path());

        let runner = BatchRunner::new(batch_in(dir.path(), false), Arc::new(FixedSource)).unwrap();
        check(&runner.run(), dir.path());
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        setup(dir.path());

        let runner = BatchRunner::new(batch_in(dir.path(), true), Arc::new(FixedSource)).unwrap();
        check(&runner.run(), dir.path());
    }

    #[test]
    fn test_missing_events_file_fails_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("250117_PA.wav"), b"").unwrap();

        let runner = BatchRunner::new(batch_in(dir.path(), false), Arc::new(FixedSource)).unwrap();
        let result = runner.analyze_session(&SessionSpec::new("250117", "PA"));
        assert!(matches!(result, Err(EmgError::Io { .. })));
    }

    #[test]
    fn test_summary_serializes_status_tag() {
        let summary = BatchSummary {
            outcomes: vec![SessionOutcome {
                session: SessionSpec::new("250117", "PA"),
                status: SessionStatus::Skipped {
                    reason: "missing".to_string(),
                },
            }],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(json.contains("\"subject\":\"PA\""));
    }
}
