use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

use super::params::GaugeParams;
use super::words::count_words;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    #[default]
    Idle,
    Active,
    Completed,
    Interrupted,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Active => "active",
            EngineStatus::Completed => "completed",
            EngineStatus::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// In-memory state of the current sitting. Never stored as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineState {
    pub text: String,
    pub status: EngineStatus,
    pub start_time: Option<DateTime<Utc>>,
    /// Always within `[GAUGE_MIN, GAUGE_MAX]`.
    pub gauge_level: f64,
    pub last_type_time: Option<DateTime<Utc>>,
    pub in_flow: bool,
    pub flow_start_time: Option<DateTime<Utc>>,
    pub previous_char_count: usize,
    /// Identity of the stored record once completed.
    pub saved_session_id: Option<SessionId>,
}

impl EngineState {
    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }

    pub fn can_complete(&self, params: &GaugeParams) -> bool {
        self.word_count() >= params.word_target
    }

    /// 0.0 .. 100.0 progress toward the word target.
    pub fn progress(&self, params: &GaugeParams) -> f64 {
        if params.word_target == 0 {
            return 100.0;
        }
        (self.word_count() as f64 / params.word_target as f64 * 100.0).min(100.0)
    }

    pub fn is_active(&self) -> bool {
        self.status == EngineStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == EngineStatus::Completed
    }

    pub fn is_interrupted(&self) -> bool {
        self.status == EngineStatus::Interrupted
    }

    /// Milliseconds from start to `now`, zero if never started.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        self.start_time
            .map(|start| (now - start).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub(crate) fn clear_flow(&mut self) {
        self.in_flow = false;
        self.flow_start_time = None;
    }
}
