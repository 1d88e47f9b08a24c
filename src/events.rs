// src/events.rs
//! Event log parsing
//!
//! Marker files are plain text, one `<id>,<time_in_seconds>` pair per line.
//! Blank lines and `#` comments are ignored. Lines that do not carry an id
//! and a parseable time are skipped without error so hand-edited logs still
//! load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::constants::events::{COMMENT_PREFIX, FIELD_DELIMITER};
use crate::error::{EmgError, EmgResult};

/// A single marker from the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Seconds from the start of the untrimmed recording
    pub timestamp_s: f64,
}

/// Source-ordered sequence of events; duplicate ids are kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Parse an event log from text
    pub fn parse(text: &str) -> Self {
        let events = text
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let event = parse_line(line);
                if event.is_none() {
                    trace!(line = index + 1, "skipping event log line");
                }
                event
            })
            .collect();

        Self { events }
    }

    /// Read and parse an event log file
    pub fn from_file<P: AsRef<Path>>(path: P) -> EmgResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EmgError::io(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamps of every event whose id equals `event_id`, in source order
    ///
    /// Returns an empty vector when nothing matches.
    pub fn timestamps_for(&self, event_id: &str) -> Vec<f64> {
        let target = event_id.trim();
        self.events
            .iter()
            .filter(|event| event.id == target)
            .map(|event| event.timestamp_s)
            .collect()
    }

    /// Timestamp of the first event with `event_id`
    pub fn anchor_time(&self, event_id: &str) -> EmgResult<f64> {
        let target = event_id.trim();
        self.events
            .iter()
            .find(|event| event.id == target)
            .map(|event| event.timestamp_s)
            .ok_or_else(|| EmgError::NoAnchorEvent {
                event_id: target.to_string(),
            })
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Timestamps for `event_id` in a log given as text
pub fn read_events(text: &str, event_id: &str) -> Vec<f64> {
    EventLog::parse(text).timestamps_for(event_id)
}

fn parse_line(line: &str) -> Option<Event> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return None;
    }

    let mut fields = line.split(FIELD_DELIMITER);
    let id = fields.next()?.trim();
    let time = fields.next()?.trim();

    let timestamp_s = time.parse::<f64>().ok().filter(|t| t.is_finite())?;

    Some(Event {
        id: id.to_string(),
        timestamp_s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LOG: &str = "1,5.0\n2,15.0\n# comment\n,bad\n2,25.0";

    #[test]
    fn test_target_id_in_source_order() {
        assert_eq!(read_events(SAMPLE_LOG, "2"), vec![15.0, 25.0]);
    }

    #[test]
    fn test_unknown_id_returns_empty() {
        assert!(read_events(SAMPLE_LOG, "9").is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let log = EventLog::parse(SAMPLE_LOG);
        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[0].id, "1");
    }

    #[test]
    fn test_whitespace_trimmed_on_both_sides() {
        let log = EventLog::parse("  2 ,  12.5  \r\n\t3,1\n");
        assert_eq!(log.timestamps_for(" 2 "), vec![12.5]);
        assert_eq!(log.timestamps_for("3"), vec![1.0]);
    }

    #[test]
    fn test_lines_without_delimiter_skipped() {
        let log = EventLog::parse("2\n2;5.0\n\n   \n2,7");
        assert_eq!(log.timestamps_for("2"), vec![7.0]);
    }

    #[test]
    fn test_unparseable_times_skipped() {
        let log = EventLog::parse("2,abc\n2,\n2,nan\n2,inf\n2,1e1");
        assert_eq!(log.timestamps_for("2"), vec![10.0]);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let log = EventLog::parse("2,3.5,trigger\n");
        assert_eq!(log.timestamps_for("2"), vec![3.5]);
    }

    #[test]
    fn test_empty_id_is_an_id() {
        let log = EventLog::parse(",4.0");
        assert_eq!(log.timestamps_for(""), vec![4.0]);
    }

    #[test]
    fn test_indented_comment_skipped() {
        let log = EventLog::parse("   # 2,5.0\n2,6.0");
        assert_eq!(log.timestamps_for("2"), vec![6.0]);
    }

    #[test]
    fn test_anchor_time_takes_first_match() {
        let log = EventLog::parse(SAMPLE_LOG);
        assert_eq!(log.anchor_time("2").unwrap(), 15.0);
    }

    #[test]
    fn test_missing_anchor_is_explicit_error() {
        let log = EventLog::parse(SAMPLE_LOG);
        match log.anchor_time("9") {
            Err(EmgError::NoAnchorEvent { event_id }) => assert_eq!(event_id, "9"),
            other => panic!("Expected NoAnchorEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_LOG).unwrap();

        let log = EventLog::from_file(file.path()).unwrap();
        assert_eq!(log.timestamps_for("2"), vec![15.0, 25.0]);
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            EventLog::from_file("no/such/events.txt"),
            Err(EmgError::Io { .. })
        ));
    }
}
