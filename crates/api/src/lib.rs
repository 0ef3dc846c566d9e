//! Shared API types for the overseer backend.
//!
//! This crate is the single source of truth for every request/response shape
//! the client exchanges with the run supervisor backend. All endpoints are
//! idempotent reads except cancellation, whose effect is only ever observed
//! through a later poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export core model types for convenience
pub use overseer_core::activity::{Activity, ActivityKind, ActivityStatus};
pub use overseer_core::thread::{
    Segment, StepStatus, SubAgentStatus, SubAgentStream, ToolStep, ToolStub, Turn, TurnBody,
};
pub use overseer_core::workspace::ListingEntry;

// ─── Health ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub version: String,
}

// ─── Transcript ──────────────────────────────────────────────────────────

/// Full snapshot of a thread's transcript. Append-mostly between polls;
/// every turn and step carries a stable id for identity-preserving
/// reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSnapshotResponse {
    pub thread_id: String,
    pub turns: Vec<Turn>,
}

// ─── Workspace ───────────────────────────────────────────────────────────

/// Listing of one directory inside the run's sandbox. `path` is the
/// resolved absolute path; for the root request it also fixes the
/// displayed workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirListingResponse {
    pub path: String,
    pub entries: Vec<ListingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReadResponse {
    pub path: String,
    pub content: String,
}

// ─── Activities ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityListResponse {
    pub activities: Vec<Activity>,
}

/// Cancellation intent, keyed by the activity's correlation id. The
/// backend acknowledges receipt; status changes arrive via polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub correlation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ─── Sandbox lifecycle ───────────────────────────────────────────────────

/// Read-only sandbox lifecycle status; annotates the UI header and never
/// feeds reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxStatusResponse {
    pub state: SandboxState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SandboxState {
    Running,
    Paused,
    Destroyed,
    Unknown,
}

impl SandboxState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Destroyed => "destroyed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SandboxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_snapshot_parses_backend_json() {
        let json = r#"{
            "thread_id": "th-1",
            "turns": [
                {"turn_id": "u1", "timestamp": "2026-01-05T10:00:00Z", "role": "user", "text": "hi"},
                {"turn_id": "a1", "timestamp": "2026-01-05T10:00:02Z", "role": "assistant", "segments": [
                    {"type": "text", "content": "looking"},
                    {"type": "tool", "step": {
                        "step_id": "s1", "name": "run_command",
                        "args": {"cmd": "ls"}, "status": "calling"
                    }}
                ]}
            ]
        }"#;
        let snapshot: ThreadSnapshotResponse = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.thread_id, "th-1");
        assert_eq!(snapshot.turns.len(), 2);
        let step = snapshot.turns[1].segments()[1].as_step().unwrap();
        assert_eq!(step.status, StepStatus::Calling);
        assert_eq!(step.args["cmd"], "ls");
    }

    #[test]
    fn delegation_step_carries_subagent_stream() {
        let json = r#"{
            "step_id": "s2", "name": "delegate", "status": "calling",
            "subagent": {"status": "running", "thread_id": "sub-1", "text": "working..."}
        }"#;
        let step: ToolStep = serde_json::from_str(json).unwrap();
        assert!(step.is_delegation());
        let stream = step.subagent.unwrap();
        assert_eq!(stream.thread_id.as_deref(), Some("sub-1"));
        assert_eq!(stream.status, SubAgentStatus::Running);
    }

    #[test]
    fn sandbox_state_serializes_snake_case() {
        let json = serde_json::to_string(&SandboxState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        assert_eq!(SandboxState::Paused.to_string(), "paused");
    }

    #[test]
    fn dir_listing_roundtrip() {
        let resp = DirListingResponse {
            path: "/work".to_string(),
            entries: vec![
                ListingEntry {
                    name: "src".to_string(),
                    is_dir: true,
                    size: None,
                },
                ListingEntry {
                    name: "README.md".to_string(),
                    is_dir: false,
                    size: Some(120),
                },
            ],
        };
        let json = serde_json::to_string(&resp).unwrap();
        let parsed: DirListingResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert!(parsed.entries[0].is_dir);
    }
}
