use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tool names treated as delegation-class: they spawn a nested agent run
/// with its own thread.
pub const DELEGATION_TOOLS: &[&str] = &["delegate", "spawn_agent", "subagent"];

/// Tool names treated as write-class for presentation: detail auto-expands
/// while calling and collapses once terminal.
pub const WRITE_TOOLS: &[&str] = &["write_file", "edit_file", "apply_patch"];

/// One message unit in a thread transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier assigned by the backend
    pub turn_id: String,
    /// When this turn was created
    pub timestamp: DateTime<Utc>,
    /// Role-specific payload
    #[serde(flatten)]
    pub body: TurnBody,
}

/// Role-specific turn payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TurnBody {
    User { text: String },
    Assistant { segments: Vec<Segment> },
}

impl Turn {
    pub fn is_assistant(&self) -> bool {
        matches!(self.body, TurnBody::Assistant { .. })
    }

    /// Segments of an assistant turn; empty slice for user turns.
    pub fn segments(&self) -> &[Segment] {
        match &self.body {
            TurnBody::Assistant { segments } => segments,
            TurnBody::User { .. } => &[],
        }
    }
}

/// A text or tool-invocation sub-unit of an assistant turn.
/// Order is significant and fixed once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { content: String },
    Tool { step: ToolStep },
}

impl Segment {
    pub fn as_step(&self) -> Option<&ToolStep> {
        match self {
            Self::Tool { step } => Some(step),
            Self::Text { .. } => None,
        }
    }
}

/// A recorded invocation of an agent capability with a lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStep {
    /// Stable identifier assigned by the backend
    pub step_id: String,
    /// Tool name, e.g. "run_command"
    pub name: String,
    /// Opaque structured arguments
    #[serde(default)]
    pub args: serde_json::Value,
    /// Lifecycle status
    pub status: StepStatus,
    /// Result text, present once terminal (verbatim for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Nested run stream, present only for delegation-class tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent: Option<SubAgentStream>,
}

impl ToolStep {
    /// Whether this step spawns a nested agent run.
    pub fn is_delegation(&self) -> bool {
        self.subagent.is_some() || DELEGATION_TOOLS.contains(&self.name.as_str())
    }

    /// Whether this step is write-class for presentation purposes.
    pub fn is_write(&self) -> bool {
        WRITE_TOOLS.contains(&self.name.as_str())
    }
}

/// Tool step lifecycle. `Calling` is the only non-terminal state;
/// transitions out of a terminal state are never legal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Calling,
    Done,
    Error,
    Cancelled,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Calling)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calling => "calling",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live stream of a delegated run, as reported on the parent step.
/// Exactly one stream exists per delegation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgentStream {
    /// Thread id of the nested run; absent until the backend opens it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub status: SubAgentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: String,
    /// Raw live text buffer, shown until the nested thread reconciles
    #[serde(default)]
    pub text: String,
    /// In-flight tool-call stubs for the startup race window
    #[serde(default)]
    pub tool_stubs: Vec<ToolStub>,
    /// Delegation error, shown verbatim; never fails the parent transcript
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubAgentStatus {
    Running,
    Completed,
    Error,
}

impl SubAgentStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Minimal stub for a tool call the nested run has started but not yet
/// reconciled into its own transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStub {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}
