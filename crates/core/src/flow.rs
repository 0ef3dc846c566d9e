//! Flow item extraction: the deduplicated diagnostic view of a transcript.
//!
//! The structurally last non-empty text segment of an assistant turn is the
//! primary rendered answer, so it is excluded here; every tool segment and
//! every other non-empty text segment is kept, in original order.

use crate::thread::{Segment, ToolStep, Turn};

/// An element of the diagnostic flow view.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowItem<'a> {
    /// Intermediate "thinking out loud" narration
    Narration { turn_id: &'a str, text: &'a str },
    /// A tool invocation
    Step { turn_id: &'a str, step: &'a ToolStep },
}

impl<'a> FlowItem<'a> {
    pub fn as_step(&self) -> Option<&'a ToolStep> {
        match self {
            Self::Step { step, .. } => Some(step),
            Self::Narration { .. } => None,
        }
    }
}

/// Flow items for a single assistant turn. User turns yield nothing.
pub fn turn_flow(turn: &Turn) -> Vec<FlowItem<'_>> {
    let segments = turn.segments();
    let last_text_index = segments
        .iter()
        .rposition(|s| matches!(s, Segment::Text { content } if !content.trim().is_empty()));

    segments
        .iter()
        .enumerate()
        .filter_map(|(index, segment)| match segment {
            Segment::Tool { step } => Some(FlowItem::Step {
                turn_id: &turn.turn_id,
                step,
            }),
            Segment::Text { content } => {
                if content.trim().is_empty() || Some(index) == last_text_index {
                    None
                } else {
                    Some(FlowItem::Narration {
                        turn_id: &turn.turn_id,
                        text: content,
                    })
                }
            }
        })
        .collect()
}

/// Flow items for a whole transcript, in turn order.
pub fn thread_flow(turns: &[Turn]) -> Vec<FlowItem<'_>> {
    turns.iter().flat_map(turn_flow).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assistant_turn, text_segment, tool_segment, tool_step, user_turn};
    use crate::thread::StepStatus;

    fn labels(items: &[FlowItem<'_>]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                FlowItem::Narration { text, .. } => format!("text:{text}"),
                FlowItem::Step { step, .. } => format!("step:{}", step.step_id),
            })
            .collect()
    }

    #[test]
    fn last_non_empty_text_is_excluded() {
        // [text A, tool T1, text B, tool T2, text C] → [A, T1, B, T2]
        let turn = assistant_turn(
            "a1",
            vec![
                text_segment("A"),
                tool_segment(tool_step("T1", "run_command", StepStatus::Done)),
                text_segment("B"),
                tool_segment(tool_step("T2", "read_file", StepStatus::Done)),
                text_segment("C"),
            ],
        );
        assert_eq!(
            labels(&turn_flow(&turn)),
            ["text:A", "step:T1", "text:B", "step:T2"]
        );
    }

    #[test]
    fn empty_trailing_text_does_not_count_as_the_answer() {
        // C is whitespace, so B is the structurally last non-empty text.
        let turn = assistant_turn(
            "a1",
            vec![
                text_segment("A"),
                tool_segment(tool_step("T1", "run_command", StepStatus::Done)),
                text_segment("B"),
                text_segment("   "),
            ],
        );
        assert_eq!(labels(&turn_flow(&turn)), ["text:A", "step:T1"]);
    }

    #[test]
    fn tool_only_turn_keeps_every_step() {
        let turn = assistant_turn(
            "a1",
            vec![
                tool_segment(tool_step("T1", "run_command", StepStatus::Calling)),
                tool_segment(tool_step("T2", "read_file", StepStatus::Calling)),
            ],
        );
        assert_eq!(labels(&turn_flow(&turn)), ["step:T1", "step:T2"]);
    }

    #[test]
    fn single_text_turn_yields_nothing() {
        let turn = assistant_turn("a1", vec![text_segment("the answer")]);
        assert!(turn_flow(&turn).is_empty());
    }

    #[test]
    fn user_turns_are_skipped_in_thread_flow() {
        let turns = vec![
            user_turn("u1", "hi"),
            assistant_turn(
                "a1",
                vec![
                    tool_segment(tool_step("T1", "run_command", StepStatus::Done)),
                    text_segment("answer"),
                ],
            ),
        ];
        assert_eq!(labels(&thread_flow(&turns)), ["step:T1"]);
    }
}
