use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::aggregate::summarize;
use crate::error::HistoryError;
use crate::loader::load_records;
use crate::text::{title_case, truncate_preview};
use crate::types::{display_timestamp, Record, SessionSummary};

/// Number of events `tail` shows when no count is given.
pub const DEFAULT_TAIL: usize = 20;
/// Characters of a message shown per `tail` entry.
pub const TAIL_PREVIEW_CHARS: usize = 200;
/// Characters of a message shown per search hit.
pub const SEARCH_PREVIEW_CHARS: usize = 300;

const EXPORT_ID_CHARS: usize = 20;
const EXPORT_TITLE: &str = "ClaudeXClaw Collaboration Session Export";

/// Result of the `list` view.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListing {
    /// Sorted by last activity, most recent first.
    pub sessions: Vec<SessionSummary>,
    pub total_sessions: usize,
    pub total_events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TailEntry<'a> {
    pub record: &'a Record,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub record: &'a Record,
    /// Message cut to [`SEARCH_PREVIEW_CHARS`], not yet highlighted.
    pub preview: String,
}

/// Aggregate statistics over the whole log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_events: usize,
    pub sessions: usize,
    /// Mean message length in characters, 0 for an empty log.
    pub avg_message_len: f64,
    /// `"<from> → <to>"` to event count, in key order.
    pub by_direction: BTreeMap<String, usize>,
    pub first_event: Option<String>,
    pub last_event: Option<String>,
}

impl HistoryStats {
    pub fn compute(records: &[Record]) -> Self {
        let total_events = records.len();
        let sessions = records
            .iter()
            .map(Record::session_id)
            .collect::<HashSet<_>>()
            .len();

        let avg_message_len = if total_events == 0 {
            0.0
        } else {
            let chars: usize = records.iter().map(|r| r.message().chars().count()).sum();
            chars as f64 / total_events as f64
        };

        let mut by_direction = BTreeMap::new();
        for record in records {
            *by_direction.entry(record.direction()).or_insert(0) += 1;
        }

        let timestamps = || records.iter().map(Record::timestamp).filter(|ts| !ts.is_empty());
        let first_event = timestamps().min().map(str::to_string);
        let last_event = timestamps().max().map(str::to_string);

        Self {
            total_events,
            sessions,
            avg_message_len,
            by_direction,
            first_event,
            last_event,
        }
    }
}

/// An exported session: where it was written and what was written.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedSession {
    pub path: PathBuf,
    pub text: String,
}

/// The collaboration log loaded into memory, with its read-only views.
pub struct History {
    log_path: PathBuf,
    records: Vec<Record>,
}

impl History {
    /// Load the log at `log_path`. A missing file yields an empty history.
    pub fn load(log_path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let log_path = log_path.into();
        let records = load_records(&log_path)?;
        Ok(Self { log_path, records })
    }

    /// Build a history from records already in memory (useful for testing).
    pub fn from_records(log_path: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        Self {
            log_path: log_path.into(),
            records,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Directory exports are written to.
    pub fn log_dir(&self) -> &Path {
        self.log_path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Session summaries, most recently active first. `None` when the log is empty.
    pub fn list(&self) -> Option<SessionListing> {
        if self.is_empty() {
            return None;
        }

        let mut sessions = summarize(&self.records);
        // Stable: sessions with equal last activity keep first-appearance order.
        sessions.sort_by(|a, b| {
            let a = a.last_timestamp.as_deref().unwrap_or("");
            let b = b.last_timestamp.as_deref().unwrap_or("");
            b.cmp(a)
        });

        Some(SessionListing {
            total_sessions: sessions.len(),
            total_events: self.records.len(),
            sessions,
        })
    }

    /// Records of one session in file order. `None` when no record matches.
    pub fn show(&self, session_id: &str) -> Option<Vec<&Record>> {
        let records: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| r.session_id() == session_id)
            .collect();

        if records.is_empty() {
            None
        } else {
            Some(records)
        }
    }

    /// The last `n` records of the log, in file order.
    pub fn tail(&self, n: usize) -> Vec<TailEntry<'_>> {
        let start = self.records.len().saturating_sub(n);
        self.records[start..]
            .iter()
            .map(|record| TailEntry {
                record,
                preview: truncate_preview(record.message(), TAIL_PREVIEW_CHARS),
            })
            .collect()
    }

    /// `None` when the log is empty.
    pub fn stats(&self) -> Option<HistoryStats> {
        if self.is_empty() {
            None
        } else {
            Some(HistoryStats::compute(&self.records))
        }
    }

    /// Records whose message contains `keyword`, ignoring case, in file order.
    pub fn search(&self, keyword: &str) -> Vec<SearchHit<'_>> {
        let needle = keyword.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.message().to_lowercase().contains(&needle))
            .map(|record| SearchHit {
                record,
                preview: truncate_preview(record.message(), SEARCH_PREVIEW_CHARS),
            })
            .collect()
    }

    /// Export a session next to the log, stamped with the current local time.
    pub fn export(&self, session_id: &str) -> Result<Option<ExportedSession>, HistoryError> {
        self.export_at(session_id, Local::now().naive_local())
    }

    /// Render and write a session export. `None` (and no file) when the
    /// session has no records.
    pub fn export_at(
        &self,
        session_id: &str,
        exported_at: NaiveDateTime,
    ) -> Result<Option<ExportedSession>, HistoryError> {
        let Some(records) = self.show(session_id) else {
            return Ok(None);
        };

        let text = render_export(session_id, &records, exported_at);
        let path = self.log_dir().join(export_file_name(session_id));

        std::fs::write(&path, &text).map_err(|source| HistoryError::Export {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Exported session {} to {:?}", session_id, path);

        Ok(Some(ExportedSession { path, text }))
    }
}

/// File name of a session export: `export_<first 20 chars of id>.txt`.
///
/// Path separators in the id are replaced so the export stays in the log
/// directory.
pub fn export_file_name(session_id: &str) -> String {
    let prefix: String = session_id
        .chars()
        .take(EXPORT_ID_CHARS)
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("export_{}.txt", prefix)
}

/// Plain-text transcript of a session, as written by `export`.
pub fn render_export(session_id: &str, records: &[&Record], exported_at: NaiveDateTime) -> String {
    let mut lines = vec![
        EXPORT_TITLE.to_string(),
        format!("Session ID: {}", session_id),
        format!("Exported: {}", iso_timestamp(exported_at)),
        "=".repeat(60),
        String::new(),
    ];

    for record in records {
        lines.push(format!(
            "[{}] {} → {}",
            display_timestamp(record.timestamp()),
            title_case(record.from()),
            title_case(record.to())
        ));
        lines.push(record.message().to_string());
        lines.push("-".repeat(40));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// ISO-8601 local time, with microseconds only when they are non-zero.
fn iso_timestamp(at: NaiveDateTime) -> String {
    let micros = at.nanosecond() / 1_000;
    if micros == 0 {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", at.format("%Y-%m-%dT%H:%M:%S"), micros)
    }
}
