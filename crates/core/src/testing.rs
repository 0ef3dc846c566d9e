use crate::thread::{
    Segment, StepStatus, SubAgentStatus, SubAgentStream, ToolStep, Turn, TurnBody,
};

/// User turn with plain text.
pub fn user_turn(id: &str, text: &str) -> Turn {
    Turn {
        turn_id: id.to_string(),
        timestamp: chrono::Utc::now(),
        body: TurnBody::User {
            text: text.to_string(),
        },
    }
}

/// Assistant turn with the given segments.
pub fn assistant_turn(id: &str, segments: Vec<Segment>) -> Turn {
    Turn {
        turn_id: id.to_string(),
        timestamp: chrono::Utc::now(),
        body: TurnBody::Assistant { segments },
    }
}

pub fn text_segment(content: &str) -> Segment {
    Segment::Text {
        content: content.to_string(),
    }
}

pub fn tool_segment(step: ToolStep) -> Segment {
    Segment::Tool { step }
}

/// Tool step with no result and no subagent stream.
pub fn tool_step(id: &str, name: &str, status: StepStatus) -> ToolStep {
    ToolStep {
        step_id: id.to_string(),
        name: name.to_string(),
        args: serde_json::Value::Null,
        status,
        result: None,
        subagent: None,
    }
}

/// Terminal tool step with a result.
pub fn finished_step(id: &str, name: &str, status: StepStatus, result: &str) -> ToolStep {
    ToolStep {
        result: Some(result.to_string()),
        ..tool_step(id, name, status)
    }
}

/// Running subagent stream with the given nested thread id and live text.
pub fn running_stream(thread_id: Option<&str>, text: &str) -> SubAgentStream {
    SubAgentStream {
        thread_id: thread_id.map(str::to_string),
        status: SubAgentStatus::Running,
        description: String::new(),
        prompt: String::new(),
        text: text.to_string(),
        tool_stubs: Vec::new(),
        error: None,
    }
}
