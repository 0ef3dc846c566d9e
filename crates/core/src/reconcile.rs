//! Transcript reconciliation: turns a periodically re-fetched, append-mostly
//! snapshot into a stable, incrementally-updatable turn list.
//!
//! `merge` is a pure function so the rules are testable in isolation;
//! [`ThreadStore`] is the thin stateful wrapper the client polls into.

use std::collections::HashMap;

use crate::thread::{Segment, StepStatus, ToolStep, Turn, TurnBody};

/// Whether a store reconciles the primary thread or a nested delegated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadScope {
    Primary,
    Nested { parent_step_id: String },
}

/// Identity-stable ordered turn list for one thread.
///
/// Polling cadence is owned by the caller; the store only merges.
#[derive(Debug, Clone)]
pub struct ThreadStore {
    pub thread_id: String,
    pub scope: ThreadScope,
    pub turns: Vec<Turn>,
}

impl ThreadStore {
    pub fn new(thread_id: impl Into<String>, scope: ThreadScope) -> Self {
        Self {
            thread_id: thread_id.into(),
            scope,
            turns: Vec::new(),
        }
    }

    /// Merge a freshly fetched snapshot into the cached turn list.
    /// Returns `true` when the rendered list changed.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Turn>) -> bool {
        let next = merge(&self.turns, snapshot);
        let changed = next != self.turns;
        self.turns = next;
        changed
    }

    /// Whether any step anywhere in the transcript is still calling.
    pub fn has_calling_steps(&self) -> bool {
        self.turns
            .iter()
            .flat_map(|t| t.segments())
            .filter_map(Segment::as_step)
            .any(|s| s.status == StepStatus::Calling)
    }

    /// Delegation-class steps, in transcript order.
    pub fn delegations(&self) -> impl Iterator<Item = &ToolStep> {
        self.turns
            .iter()
            .flat_map(|t| t.segments())
            .filter_map(Segment::as_step)
            .filter(|s| s.is_delegation())
    }

    /// Look up a step anywhere in the transcript by id.
    pub fn find_step(&self, step_id: &str) -> Option<&ToolStep> {
        self.turns
            .iter()
            .flat_map(|t| t.segments())
            .filter_map(Segment::as_step)
            .find(|s| s.step_id == step_id)
    }
}

/// Merge rules (see module docs):
///
/// - empty cache adopts the snapshot wholesale;
/// - a different first turn id means the thread was reset: replace wholesale;
/// - non-trailing cached turns keep their identity; the only in-place change
///   allowed on them is a calling→terminal step transition;
/// - the trailing cached turn is updated in place from its snapshot
///   counterpart, with terminal step statuses never regressing;
/// - snapshot turns past the cached length are appended;
/// - a snapshot shorter than the cache (same first id) is treated as lagging:
///   already-rendered turns are kept.
pub fn merge(previous: &[Turn], snapshot: Vec<Turn>) -> Vec<Turn> {
    if previous.is_empty() {
        return snapshot;
    }
    let Some(first) = snapshot.first() else {
        return previous.to_vec();
    };
    if first.turn_id != previous[0].turn_id {
        // Thread reset: the cache describes a different conversation.
        return snapshot;
    }

    let terminal_steps = collect_terminal_steps(previous);
    let trailing_index = previous.len() - 1;

    let mut next = Vec::with_capacity(previous.len().max(snapshot.len()));
    let mut snapshot_iter = snapshot.into_iter();

    for (index, prev_turn) in previous.iter().enumerate() {
        let snap_turn = snapshot_iter.next();
        if index < trailing_index {
            let mut kept = prev_turn.clone();
            if let Some(snap) = snap_turn {
                apply_terminal_transitions(&mut kept, &snap);
            }
            next.push(kept);
        } else {
            // Trailing turn: adopt the snapshot content, guarding monotonicity.
            match snap_turn {
                Some(mut snap) => {
                    restore_terminal_steps(&mut snap, &terminal_steps);
                    next.push(snap);
                }
                None => next.push(prev_turn.clone()),
            }
        }
    }

    for mut appended in snapshot_iter {
        restore_terminal_steps(&mut appended, &terminal_steps);
        next.push(appended);
    }

    next
}

/// Map of step id → (status, result) for every terminal step in the cache.
fn collect_terminal_steps(turns: &[Turn]) -> HashMap<&str, (StepStatus, Option<&str>)> {
    turns
        .iter()
        .flat_map(|t| t.segments())
        .filter_map(Segment::as_step)
        .filter(|s| s.status.is_terminal())
        .map(|s| (s.step_id.as_str(), (s.status, s.result.as_deref())))
        .collect()
}

/// Apply calling→terminal transitions from `snap` onto `kept` in place.
/// This is the only mutation a non-trailing turn accepts.
fn apply_terminal_transitions(kept: &mut Turn, snap: &Turn) {
    let TurnBody::Assistant { segments } = &mut kept.body else {
        return;
    };
    let snap_steps: HashMap<&str, &ToolStep> = snap
        .segments()
        .iter()
        .filter_map(Segment::as_step)
        .map(|s| (s.step_id.as_str(), s))
        .collect();

    for segment in segments {
        let Segment::Tool { step } = segment else {
            continue;
        };
        if step.status.is_terminal() {
            continue;
        }
        if let Some(reported) = snap_steps.get(step.step_id.as_str()) {
            if reported.status.is_terminal() {
                step.status = reported.status;
                step.result = reported.result.clone();
                step.subagent = reported.subagent.clone();
            } else if step.subagent.is_some() || reported.subagent.is_some() {
                // Still calling: keep the delegation stream fresh.
                step.subagent = reported.subagent.clone();
            }
        }
    }
}

/// Undo any status regression the snapshot would introduce for steps the
/// cache already saw reach a terminal state.
fn restore_terminal_steps(turn: &mut Turn, terminal: &HashMap<&str, (StepStatus, Option<&str>)>) {
    let TurnBody::Assistant { segments } = &mut turn.body else {
        return;
    };
    for segment in segments {
        let Segment::Tool { step } = segment else {
            continue;
        };
        if step.status.is_terminal() {
            continue;
        }
        if let Some((status, result)) = terminal.get(step.step_id.as_str()) {
            step.status = *status;
            step.result = result.map(str::to_string);
        }
    }
}
