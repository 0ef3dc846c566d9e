//! Out-of-band running and just-finished operations.
//!
//! Activities are independent of the tool-step list; visibility is
//! time-filtered on each render rather than driven by a timer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a terminal activity stays visible.
pub const LINGER_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub label: String,
    pub status: ActivityStatus,
    pub start_time: DateTime<Utc>,
    /// Set when the activity reaches a terminal status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Tail of the operation's output, for preview
    #[serde(default)]
    pub output_tail: String,
    /// Key for cancellation requests
    pub correlation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Command,
    BackgroundTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Running,
    Done,
    Error,
    Cancelled,
}

impl ActivityStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Activity {
    /// Included while running, or for [`LINGER_SECONDS`] after the terminal
    /// timestamp (`finished_at`, falling back to `start_time`).
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        if !self.status.is_terminal() {
            return true;
        }
        let reference = self.finished_at.unwrap_or(self.start_time);
        now - reference <= Duration::seconds(LINGER_SECONDS)
    }
}

/// Activities to show right now, preserving input order.
pub fn visible_activities(activities: &[Activity], now: DateTime<Utc>) -> Vec<&Activity> {
    activities.iter().filter(|a| a.is_visible(now)).collect()
}
