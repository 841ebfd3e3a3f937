use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{MoodLevel, SessionId};
use crate::writing::EngineStatus;

/// Every state change of the session engine produces an Event.
/// Front ends print or forward them; nothing in the core stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        date: NaiveDate,
        seed_words: usize,
        gauge_level: f64,
        at: DateTime<Utc>,
    },
    /// Gauge held at maximum for the flow threshold.
    FlowEntered {
        gauge_level: f64,
        at: DateTime<Utc>,
    },
    /// Gauge dropped below maximum while in flow.
    FlowExited {
        gauge_level: f64,
        at: DateTime<Utc>,
    },
    /// Word target met and completion accepted. `session_id` is `None` when
    /// the record could not be stored.
    SessionCompleted {
        session_id: Option<SessionId>,
        date: NaiveDate,
        word_count: usize,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Gauge ran dry before the word target. `session_id` is `None` when the
    /// draft could not be stored.
    SessionInterrupted {
        session_id: Option<SessionId>,
        date: NaiveDate,
        word_count: usize,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Today's completed record was found and loaded.
    SessionRestored {
        session_id: Option<SessionId>,
        date: NaiveDate,
        word_count: usize,
        at: DateTime<Utc>,
    },
    MoodRecorded {
        session_id: SessionId,
        mood: MoodLevel,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: EngineStatus,
        word_count: usize,
        word_target: usize,
        progress_pct: f64,
        gauge_level: f64,
        in_flow: bool,
        can_complete: bool,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
}
