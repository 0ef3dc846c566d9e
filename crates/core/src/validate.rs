use std::collections::HashSet;

use thiserror::Error;

use crate::thread::{Segment, Turn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("duplicate turn id: {turn_id}")]
    DuplicateTurnId { turn_id: String },
    #[error("duplicate step id: {step_id}")]
    DuplicateStepId { step_id: String },
    #[error("turns out of order at index {index}")]
    TurnsOutOfOrder { index: usize },
}

/// Check the identity invariants reconciliation relies on: every turn/step
/// id is unique and turns are in non-decreasing timestamp order.
pub fn validate_snapshot(turns: &[Turn]) -> Result<(), Vec<SnapshotError>> {
    let mut errors = Vec::new();

    let mut turn_ids = HashSet::new();
    let mut step_ids = HashSet::new();
    for turn in turns {
        if !turn_ids.insert(turn.turn_id.as_str()) {
            errors.push(SnapshotError::DuplicateTurnId {
                turn_id: turn.turn_id.clone(),
            });
        }
        for step in turn.segments().iter().filter_map(Segment::as_step) {
            if !step_ids.insert(step.step_id.as_str()) {
                errors.push(SnapshotError::DuplicateStepId {
                    step_id: step.step_id.clone(),
                });
            }
        }
    }

    for (index, window) in turns.windows(2).enumerate() {
        if window[1].timestamp < window[0].timestamp {
            errors.push(SnapshotError::TurnsOutOfOrder { index: index + 1 });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assistant_turn, tool_segment, tool_step, user_turn};
    use crate::thread::StepStatus;

    #[test]
    fn clean_snapshot_passes() {
        let turns = vec![
            user_turn("u1", "hi"),
            assistant_turn(
                "a1",
                vec![tool_segment(tool_step("s1", "run_command", StepStatus::Calling))],
            ),
        ];
        assert!(validate_snapshot(&turns).is_ok());
    }

    #[test]
    fn duplicate_turn_id_is_reported() {
        let turns = vec![user_turn("u1", "hi"), user_turn("u1", "again")];
        let errors = validate_snapshot(&turns).unwrap_err();
        assert!(errors.contains(&SnapshotError::DuplicateTurnId {
            turn_id: "u1".to_string()
        }));
    }

    #[test]
    fn duplicate_step_id_across_turns_is_reported() {
        let turns = vec![
            assistant_turn(
                "a1",
                vec![tool_segment(tool_step("s1", "run_command", StepStatus::Done))],
            ),
            assistant_turn(
                "a2",
                vec![tool_segment(tool_step("s1", "read_file", StepStatus::Calling))],
            ),
        ];
        let errors = validate_snapshot(&turns).unwrap_err();
        assert_eq!(
            errors,
            vec![SnapshotError::DuplicateStepId {
                step_id: "s1".to_string()
            }]
        );
    }
}
