use std::collections::HashMap;

use crate::types::{Record, SessionSummary};

/// Group records by session id, in order of each session's first record.
///
/// First/last timestamps are the min/max by string comparison over the
/// session's non-empty timestamps; a session without any keeps `None`.
pub fn summarize(records: &[Record]) -> Vec<SessionSummary> {
    let mut summaries: Vec<SessionSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let session_id = record.session_id();
        let slot = *index.entry(session_id).or_insert_with(|| {
            summaries.push(SessionSummary::new(session_id));
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];

        summary.count += 1;
        summary.participants.insert(record.from().to_string());

        let ts = record.timestamp();
        if ts.is_empty() {
            continue;
        }
        if summary.first_timestamp.as_deref().map_or(true, |first| ts < first) {
            summary.first_timestamp = Some(ts.to_string());
        }
        if summary.last_timestamp.as_deref().map_or(true, |last| ts > last) {
            summary.last_timestamp = Some(ts.to_string());
        }
    }

    summaries
}
