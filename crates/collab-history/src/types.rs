use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Session id used for records that carry none.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Agent name used when `from` or `to` is missing.
pub const UNKNOWN_AGENT: &str = "?";

/// One line of the collaboration log.
///
/// Every field is optional on disk. Strings are taken verbatim, numbers and
/// booleans are stringified, anything else counts as absent. Use the
/// accessors, which apply the log's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,
}

impl Record {
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(UNKNOWN_SESSION)
    }

    /// Raw timestamp, `""` when absent.
    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }

    pub fn from(&self) -> &str {
        self.from.as_deref().unwrap_or(UNKNOWN_AGENT)
    }

    pub fn to(&self) -> &str {
        self.to.as_deref().unwrap_or(UNKNOWN_AGENT)
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// Task id, `""` when absent.
    pub fn task_id(&self) -> &str {
        self.task_id.as_deref().unwrap_or("")
    }

    /// `"<from> → <to>"`, the key used for direction counts.
    pub fn direction(&self) -> String {
        format!("{} → {}", self.from(), self.to())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Per-session aggregate for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub count: usize,
    /// Smallest non-empty timestamp, by string comparison.
    pub first_timestamp: Option<String>,
    /// Largest non-empty timestamp, by string comparison.
    pub last_timestamp: Option<String>,
    /// Distinct senders seen in the session.
    pub participants: BTreeSet<String>,
}

impl SessionSummary {
    pub(crate) fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            count: 0,
            first_timestamp: None,
            last_timestamp: None,
            participants: BTreeSet::new(),
        }
    }
}

/// Render a log timestamp for display: the first 19 characters with the
/// date/time `T` separator replaced by a space.
pub fn display_timestamp(timestamp: &str) -> String {
    timestamp
        .chars()
        .take(19)
        .map(|c| if c == 'T' { ' ' } else { c })
        .collect()
}
