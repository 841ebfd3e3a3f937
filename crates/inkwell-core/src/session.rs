//! Persisted session records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Repository identity of a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal status of a stored session. An active sitting is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Interrupted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Interrupted => "interrupted",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(SessionStatus::Completed),
            "interrupted" => Ok(SessionStatus::Interrupted),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// How the sitting felt, recorded after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MoodLevel {
    Struggled = 1,
    Tough = 2,
    Steady = 3,
    Smooth = 4,
    Flow = 5,
}

impl MoodLevel {
    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::Struggled => "Struggled",
            MoodLevel::Tough => "Tough",
            MoodLevel::Steady => "Steady",
            MoodLevel::Smooth => "Smooth",
            MoodLevel::Flow => "Flow",
        }
    }
}

impl TryFrom<u8> for MoodLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MoodLevel::Struggled),
            2 => Ok(MoodLevel::Tough),
            3 => Ok(MoodLevel::Steady),
            4 => Ok(MoodLevel::Smooth),
            5 => Ok(MoodLevel::Flow),
            other => Err(format!("mood must be between 1 and 5, got {other}")),
        }
    }
}

impl From<MoodLevel> for u8 {
    fn from(mood: MoodLevel) -> Self {
        mood as u8
    }
}

/// One day's writing, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SessionId>,
    pub date: NaiveDate,
    pub text: String,
    pub word_count: usize,
    pub duration_ms: u64,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn is_interrupted(&self) -> bool {
        self.status == SessionStatus::Interrupted
    }
}

/// Fields that may change on a stored session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    pub mood: Option<MoodLevel>,
    pub mood_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_rejects_out_of_range() {
        assert!(MoodLevel::try_from(0).is_err());
        assert!(MoodLevel::try_from(6).is_err());
        assert_eq!(MoodLevel::try_from(5), Ok(MoodLevel::Flow));
    }

    #[test]
    fn session_serializes_status_lowercase() {
        let session = Session {
            id: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            text: "hello".into(),
            word_count: 1,
            duration_ms: 10,
            status: SessionStatus::Interrupted,
            mood: None,
            mood_note: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["status"], "interrupted");
        assert_eq!(json["date"], "2026-01-04");
        assert!(json.get("mood").is_none());
    }
}
