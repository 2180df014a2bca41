//! # collab-history
//!
//! Read-only access to the collaboration log shared by Claude Code and
//! the clawbot agent.
//!
//! The log is an append-only JSONL file written by another process. This
//! crate loads it tolerantly into [`Record`]s and answers the views the
//! `collab_session` CLI exposes.
//!
//! ## Key Types
//!
//! - [`History`] - Loaded log plus every view (list, show, tail, stats, search, export)
//! - [`Record`] - One parsed log line with defaulting accessors
//! - [`SessionSummary`] - Per-session aggregate used by `list`
//! - [`HistoryError`] - The two fatal conditions (unreadable log, failed export)
//!
//! ## Timestamps
//!
//! Timestamps are never parsed. Ordering and ranges use plain string
//! comparison, which is only correct for fixed-width, zero-padded
//! ISO-8601 values as written by the log producer.

pub mod aggregate;
mod error;
pub mod history;
pub mod loader;
pub mod text;
pub mod types;

pub use aggregate::summarize;
pub use error::HistoryError;
pub use history::{
    export_file_name, render_export, ExportedSession, History, HistoryStats, SearchHit,
    SessionListing, TailEntry, DEFAULT_TAIL, SEARCH_PREVIEW_CHARS, TAIL_PREVIEW_CHARS,
};
pub use loader::{load_records, parse_line};
pub use text::{highlight, title_case, truncate_preview};
pub use types::{display_timestamp, Record, SessionSummary, UNKNOWN_SESSION};
