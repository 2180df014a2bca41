use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::HistoryError;
use crate::types::Record;

/// Load every well-formed record from the log at `path`, in file order.
///
/// A missing file is an empty history. Blank lines are skipped; lines that
/// are not UTF-8 or not a JSON object are dropped without error.
pub fn load_records(path: &Path) -> Result<Vec<Record>, HistoryError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Collaboration log {:?} does not exist", path);
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for raw in bytes.split(|b| *b == b'\n') {
        let Ok(line) = std::str::from_utf8(raw) else {
            dropped += 1;
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    tracing::debug!(
        "Loaded {} records from {:?} ({} malformed lines dropped)",
        records.len(),
        path,
        dropped
    );

    Ok(records)
}

/// Parse one log line. Returns `None` for anything that is not a JSON object.
pub fn parse_line(line: &str) -> Option<Record> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Going through a map rejects arrays, which serde would otherwise
    // accept positionally for a struct, and lets a repeated key win last.
    let object: Map<String, Value> = serde_json::from_str(line).ok()?;
    Record::deserialize(Value::Object(object)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_full_record() {
        let record = parse_line(
            r#"{"session_id":"s1","timestamp":"2024-01-01T00:00:00","from":"claude_code","to":"clawbot","message":"hi","task_id":"t-1"}"#,
        )
        .unwrap();

        assert_eq!(record.session_id(), "s1");
        assert_eq!(record.timestamp(), "2024-01-01T00:00:00");
        assert_eq!(record.from(), "claude_code");
        assert_eq!(record.to(), "clawbot");
        assert_eq!(record.message(), "hi");
        assert_eq!(record.task_id(), "t-1");
    }

    #[test]
    fn test_parse_line_applies_defaults() {
        let record = parse_line(r#"{"extra":{"nested":true}}"#).unwrap();

        assert_eq!(record.session_id(), "unknown");
        assert_eq!(record.timestamp(), "");
        assert_eq!(record.from(), "?");
        assert_eq!(record.to(), "?");
        assert_eq!(record.message(), "");
        assert_eq!(record.task_id(), "");
    }

    #[test]
    fn test_parse_line_tolerates_odd_field_types() {
        let record =
            parse_line(r#"{"session_id":42,"message":null,"from":["a"],"task_id":true}"#).unwrap();

        assert_eq!(record.session_id(), "42");
        assert_eq!(record.message(), "");
        assert_eq!(record.from(), "?");
        assert_eq!(record.task_id(), "true");
    }

    #[test]
    fn test_parse_line_rejects_non_objects() {
        assert!(parse_line("not json").is_none());
        assert!(parse_line(r#"["s1","2024"]"#).is_none());
        assert!(parse_line(r#""just a string""#).is_none());
        assert!(parse_line("42").is_none());
        assert!(parse_line(r#"{"session_id":"s1""#).is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn test_parse_line_last_duplicate_key_wins() {
        let record = parse_line(r#"{"session_id":"a","session_id":"b"}"#).unwrap();
        assert_eq!(record.session_id(), "b");
    }
}
