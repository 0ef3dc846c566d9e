use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use tracing::warn;

use overseer_api::{SandboxState, SandboxStatusResponse};
use overseer_core::activity::{visible_activities, Activity};
use overseer_core::config::ClientConfig;
use overseer_core::flow::thread_flow;
use overseer_core::reconcile::{ThreadScope, ThreadStore};
use overseer_core::thread::{StepStatus, ToolStep, Turn};
use overseer_core::validate::validate_snapshot;
use overseer_core::workspace::{ToggleOutcome, WorkspaceTree};

use crate::async_ops::{AsyncCommand, CommandResult};
use crate::layout::SplitPane;
use crate::poll::Poller;

const FLASH_TTL: Duration = Duration::from_secs(4);

// Side pane width bounds (columns).
const FLOW_WIDTH: (u16, u16, u16) = (44, 24, 70);
const WORKSPACE_WIDTH: (u16, u16, u16) = (36, 24, 60);

/// Which body pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Transcript,
    Flow,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Error,
}

/// Reconciliation state for one delegated run, keyed by its parent step.
pub struct SubAgentPanel {
    pub parent_step_id: String,
    pub store: ThreadStore,
    pub poller: Poller,
    pub error: Option<String>,
}

pub struct App {
    pub thread_id: String,
    pub config: ClientConfig,

    // ── Transcript ───────────────────────────────────────────────────
    pub store: ThreadStore,
    pub transcript_poller: Poller,
    pub transcript_error: Option<String>,
    pub subagents: Vec<SubAgentPanel>,

    // ── Workspace ────────────────────────────────────────────────────
    pub workspace: WorkspaceTree,
    pub workspace_error: Option<String>,
    workspace_requested: bool,

    // ── Activities ───────────────────────────────────────────────────
    pub activities: Vec<Activity>,
    pub activity_poller: Poller,
    pub activity_error: Option<String>,
    pub pending_cancels: HashSet<String>,

    // ── Sandbox ──────────────────────────────────────────────────────
    pub sandbox: Option<SandboxStatusResponse>,
    pub sandbox_poller: Poller,

    // ── UI state ─────────────────────────────────────────────────────
    pub focus: Pane,
    pub transcript_scroll: u16,
    pub flow_index: usize,
    pub tree_index: usize,
    pub activity_index: usize,
    pub show_activity_overlay: bool,
    pub show_help: bool,
    pub flow_pane: SplitPane,
    pub workspace_pane: SplitPane,
    /// Divider columns from the last rendered frame, for mouse hit tests.
    pub flow_divider_x: Option<u16>,
    pub workspace_divider_x: Option<u16>,

    // Manual step-detail overrides; unset steps follow the write-class
    // auto-expand policy.
    expanded_steps: HashSet<String>,
    collapsed_steps: HashSet<String>,

    flash: Option<(String, FlashLevel, Instant)>,
    queued_commands: Vec<AsyncCommand>,
}

impl App {
    pub fn new(thread_id: impl Into<String>, config: ClientConfig) -> Self {
        let thread_id = thread_id.into();
        let max = config.poll.max_consecutive_failures;
        let transcript_poller = Poller::new(Duration::from_millis(config.poll.transcript_ms), max);
        let activity_poller = Poller::new(Duration::from_millis(config.poll.activity_ms), max);
        let sandbox_poller = Poller::new(Duration::from_millis(config.poll.sandbox_ms), max);
        Self {
            store: ThreadStore::new(thread_id.clone(), ThreadScope::Primary),
            thread_id,
            config,
            transcript_poller,
            transcript_error: None,
            subagents: Vec::new(),
            workspace: WorkspaceTree::new(),
            workspace_error: None,
            workspace_requested: false,
            activities: Vec::new(),
            activity_poller,
            activity_error: None,
            pending_cancels: HashSet::new(),
            sandbox: None,
            sandbox_poller,
            focus: Pane::Transcript,
            transcript_scroll: 0,
            flow_index: 0,
            tree_index: 0,
            activity_index: 0,
            show_activity_overlay: false,
            show_help: false,
            flow_pane: SplitPane::new(FLOW_WIDTH.0, FLOW_WIDTH.1, FLOW_WIDTH.2, true),
            workspace_pane: SplitPane::new(
                WORKSPACE_WIDTH.0,
                WORKSPACE_WIDTH.1,
                WORKSPACE_WIDTH.2,
                true,
            ),
            flow_divider_x: None,
            workspace_divider_x: None,
            expanded_steps: HashSet::new(),
            collapsed_steps: HashSet::new(),
            flash: None,
            queued_commands: Vec::new(),
        }
    }

    // ── Poll scheduling ──────────────────────────────────────────────

    /// Commands to dispatch this tick: queued user actions plus every
    /// poll scope whose interval has elapsed.
    pub fn due_commands(&mut self, now: Instant) -> Vec<AsyncCommand> {
        let mut commands = std::mem::take(&mut self.queued_commands);

        if self.transcript_active() && self.transcript_poller.is_due(now) {
            self.transcript_poller.mark_dispatched(now);
            commands.push(AsyncCommand::FetchThread {
                thread_id: self.thread_id.clone(),
                scope: ThreadScope::Primary,
            });
        }

        let store = &self.store;
        for panel in &mut self.subagents {
            if panel_should_poll(store, panel) && panel.poller.is_due(now) {
                panel.poller.mark_dispatched(now);
                commands.push(AsyncCommand::FetchThread {
                    thread_id: panel.store.thread_id.clone(),
                    scope: panel.store.scope.clone(),
                });
            }
        }

        if self.activity_poller.is_due(now) {
            self.activity_poller.mark_dispatched(now);
            commands.push(AsyncCommand::FetchActivities {
                thread_id: self.thread_id.clone(),
            });
        }

        if self.sandbox_poller.is_due(now) {
            self.sandbox_poller.mark_dispatched(now);
            commands.push(AsyncCommand::FetchSandbox {
                thread_id: self.thread_id.clone(),
            });
        }

        if !self.workspace_requested {
            self.workspace_requested = true;
            commands.push(AsyncCommand::FetchRootListing {
                thread_id: self.thread_id.clone(),
            });
        }

        commands
    }

    /// The primary transcript polls for the whole session; only a
    /// destroyed sandbox with nothing in flight settles it.
    fn transcript_active(&self) -> bool {
        if self.store.turns.is_empty() {
            return true;
        }
        match self.sandbox.as_ref().map(|s| s.state) {
            Some(SandboxState::Destroyed) => self.store.has_calling_steps(),
            _ => true,
        }
    }

    /// Re-arm every stopped scope and poll again immediately.
    pub fn manual_refresh(&mut self) {
        self.transcript_poller.rearm();
        self.activity_poller.rearm();
        self.sandbox_poller.rearm();
        for panel in &mut self.subagents {
            panel.poller.rearm();
        }
        if !self.workspace.is_loaded() {
            self.workspace_requested = false;
        }
        self.flash_info("refreshing");
    }

    // ── Result handling ──────────────────────────────────────────────

    pub fn apply_command_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::Thread { scope, result } => match scope {
                ThreadScope::Primary => self.apply_primary_snapshot(result),
                ThreadScope::Nested { parent_step_id } => {
                    self.apply_nested_snapshot(&parent_step_id, result);
                }
            },

            CommandResult::RootListing(result) => match result {
                Ok((path, entries)) => {
                    self.workspace.install_root(&path, entries);
                    self.workspace_error = None;
                }
                Err(e) => {
                    self.workspace_error = Some(e);
                }
            },

            CommandResult::DirListing {
                path,
                token,
                result,
            } => match result {
                Ok(entries) => {
                    // Responses from superseded fetches are stale and are
                    // discarded by install_children.
                    self.workspace.install_children(&path, token, entries);
                    self.workspace_error = None;
                }
                Err(e) => {
                    // A stale failure must not disturb a fresh fetch or
                    // leave a spurious error behind.
                    if self.workspace.fetch_failed(&path, token) {
                        self.workspace_error = Some(e);
                    }
                }
            },

            CommandResult::FilePreview(result) => match result {
                Ok((path, content)) => {
                    self.workspace.set_preview(&path, content);
                    self.workspace_error = None;
                }
                Err(e) => {
                    self.workspace_error = Some(e);
                }
            },

            CommandResult::Activities(result) => match result {
                Ok(activities) => {
                    // Confirmed terminal activities no longer need the
                    // pending-cancel marker.
                    self.pending_cancels.retain(|id| {
                        activities
                            .iter()
                            .any(|a| a.correlation_id == *id && !a.status.is_terminal())
                    });
                    self.activities = activities;
                    self.activity_poller.mark_success();
                    self.activity_error = None;
                    self.clamp_selections();
                }
                Err(e) => {
                    self.activity_poller.mark_failure();
                    self.activity_error = Some(e);
                }
            },

            CommandResult::Sandbox(result) => match result {
                Ok(resp) => {
                    self.sandbox_poller.mark_success();
                    self.sandbox = Some(resp);
                }
                Err(e) => {
                    self.sandbox_poller.mark_failure();
                    warn!("sandbox status fetch failed: {e}");
                }
            },

            CommandResult::CancelAck {
                correlation_id,
                result,
            } => match result {
                Ok(()) => self.flash_info("cancellation requested"),
                Err(e) => {
                    // Allow a retry after a failed acknowledgement.
                    self.pending_cancels.remove(&correlation_id);
                    self.flash_error(format!("cancel failed: {e}"));
                }
            },
        }
    }

    fn apply_primary_snapshot(&mut self, result: Result<Vec<Turn>, String>) {
        match result {
            Ok(turns) => {
                if let Err(errors) = validate_snapshot(&turns) {
                    for e in &errors {
                        warn!("snapshot integrity: {e}");
                    }
                }
                self.store.apply_snapshot(turns);
                self.transcript_poller.mark_success();
                self.transcript_error = None;
                self.sync_subagent_panels();
                self.clamp_selections();
            }
            Err(e) => {
                self.transcript_poller.mark_failure();
                if self.transcript_poller.is_stopped() {
                    self.flash_error("transcript polling stopped; press r to resume");
                }
                self.transcript_error = Some(e);
            }
        }
    }

    fn apply_nested_snapshot(&mut self, parent_step_id: &str, result: Result<Vec<Turn>, String>) {
        let Some(panel) = self
            .subagents
            .iter_mut()
            .find(|p| p.parent_step_id == parent_step_id)
        else {
            // Panel was dropped (thread reset) while the fetch was in flight.
            return;
        };
        match result {
            Ok(turns) => {
                panel.store.apply_snapshot(turns);
                panel.poller.mark_success();
                panel.error = None;
            }
            Err(e) => {
                panel.poller.mark_failure();
                panel.error = Some(e);
            }
        }
    }

    /// One panel per delegation step whose nested thread is open. Panels
    /// keep their reconciled state across polls; panels whose parent step
    /// disappeared are dropped.
    fn sync_subagent_panels(&mut self) {
        let interval = Duration::from_millis(self.config.poll.subagent_ms);
        let max = self.config.poll.max_consecutive_failures;
        let targets: Vec<(String, String)> = self
            .store
            .delegations()
            .filter_map(|s| {
                let thread_id = s.subagent.as_ref()?.thread_id.clone()?;
                Some((s.step_id.clone(), thread_id))
            })
            .collect();

        let mut next = Vec::with_capacity(targets.len());
        for (step_id, thread_id) in targets {
            if let Some(i) = self
                .subagents
                .iter()
                .position(|p| p.parent_step_id == step_id)
            {
                next.push(self.subagents.remove(i));
            } else {
                next.push(SubAgentPanel {
                    store: ThreadStore::new(
                        thread_id,
                        ThreadScope::Nested {
                            parent_step_id: step_id.clone(),
                        },
                    ),
                    parent_step_id: step_id,
                    poller: Poller::new(interval, max),
                    error: None,
                });
            }
        }
        self.subagents = next;
    }

    pub fn panel_for(&self, step_id: &str) -> Option<&SubAgentPanel> {
        self.subagents.iter().find(|p| p.parent_step_id == step_id)
    }

    // ── Step detail expansion ────────────────────────────────────────

    /// Manual toggles win; otherwise write-class steps show their detail
    /// while calling and fold it away once terminal.
    pub fn step_expanded(&self, step: &ToolStep) -> bool {
        if self.expanded_steps.contains(&step.step_id) {
            return true;
        }
        if self.collapsed_steps.contains(&step.step_id) {
            return false;
        }
        step.is_write() && step.status == StepStatus::Calling
    }

    fn toggle_selected_step_detail(&mut self) {
        let Some((step_id, expanded)) = self.selected_flow_step() else {
            return;
        };
        if expanded {
            self.expanded_steps.remove(&step_id);
            self.collapsed_steps.insert(step_id);
        } else {
            self.collapsed_steps.remove(&step_id);
            self.expanded_steps.insert(step_id);
        }
    }

    fn selected_flow_step(&self) -> Option<(String, bool)> {
        let items = thread_flow(&self.store.turns);
        let step = items.get(self.flow_index)?.as_step()?;
        Some((step.step_id.clone(), self.step_expanded(step)))
    }

    pub fn flow_len(&self) -> usize {
        thread_flow(&self.store.turns).len()
    }

    // ── Flash messages ───────────────────────────────────────────────

    pub fn flash_info(&mut self, message: impl Into<String>) {
        self.flash = Some((message.into(), FlashLevel::Info, Instant::now()));
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash = Some((message.into(), FlashLevel::Error, Instant::now()));
    }

    pub fn visible_flash(&self, now: Instant) -> Option<(&str, FlashLevel)> {
        let (message, level, at) = self.flash.as_ref()?;
        if now.duration_since(*at) > FLASH_TTL {
            return None;
        }
        Some((message.as_str(), *level))
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Returns `true` when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            self.show_help = false;
            return false;
        }
        if self.show_activity_overlay {
            return self.handle_activity_overlay_key(code);
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.manual_refresh(),
            KeyCode::Char('a') => {
                self.show_activity_overlay = true;
                self.activity_index = 0;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Pane::Transcript => Pane::Flow,
                    Pane::Flow => Pane::Workspace,
                    Pane::Workspace => Pane::Transcript,
                };
            }
            KeyCode::Char('<') => self.resize_focused(2),
            KeyCode::Char('>') => self.resize_focused(-2),
            _ => return self.handle_pane_key(code),
        }
        false
    }

    fn resize_focused(&mut self, delta: i16) {
        match self.focus {
            Pane::Flow => self.flow_pane.nudge(delta),
            Pane::Workspace => self.workspace_pane.nudge(delta),
            Pane::Transcript => {}
        }
    }

    fn handle_pane_key(&mut self, code: KeyCode) -> bool {
        match self.focus {
            Pane::Transcript => match code {
                KeyCode::Char('j') | KeyCode::Down => {
                    self.transcript_scroll = self.transcript_scroll.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
                }
                KeyCode::PageDown => {
                    self.transcript_scroll = self.transcript_scroll.saturating_add(10);
                }
                KeyCode::PageUp => {
                    self.transcript_scroll = self.transcript_scroll.saturating_sub(10);
                }
                KeyCode::Char('g') => self.transcript_scroll = 0,
                KeyCode::Char('G') => self.transcript_scroll = u16::MAX,
                _ => {}
            },
            Pane::Flow => {
                let len = self.flow_len();
                match code {
                    KeyCode::Char('j') | KeyCode::Down => {
                        if len > 0 {
                            self.flow_index = (self.flow_index + 1).min(len - 1);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.flow_index = self.flow_index.saturating_sub(1);
                    }
                    KeyCode::Char('g') => self.flow_index = 0,
                    KeyCode::Char('G') => self.flow_index = len.saturating_sub(1),
                    KeyCode::Enter | KeyCode::Char('e') => self.toggle_selected_step_detail(),
                    _ => {}
                }
            }
            Pane::Workspace => {
                let len = self.workspace.visible().len();
                match code {
                    KeyCode::Char('j') | KeyCode::Down => {
                        if len > 0 {
                            self.tree_index = (self.tree_index + 1).min(len - 1);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.tree_index = self.tree_index.saturating_sub(1);
                    }
                    KeyCode::Char('g') => self.tree_index = 0,
                    KeyCode::Char('G') => self.tree_index = len.saturating_sub(1),
                    KeyCode::Enter => self.activate_selected_node(),
                    _ => {}
                }
            }
        }
        false
    }

    fn handle_activity_overlay_key(&mut self, code: KeyCode) -> bool {
        let len = visible_activities(&self.activities, Utc::now()).len();
        match code {
            KeyCode::Esc | KeyCode::Char('a') | KeyCode::Char('q') => {
                self.show_activity_overlay = false;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    self.activity_index = (self.activity_index + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.activity_index = self.activity_index.saturating_sub(1);
            }
            KeyCode::Char('c') => self.cancel_selected_activity(),
            _ => {}
        }
        false
    }

    /// Expand/collapse a directory, or load a file preview. A directory
    /// without cached children queues a listing fetch.
    fn activate_selected_node(&mut self) {
        let Some((path, is_dir)) = self
            .workspace
            .visible()
            .get(self.tree_index)
            .map(|(_, node)| (node.path.clone(), node.is_dir))
        else {
            return;
        };
        if is_dir {
            if self.workspace.toggle(&path) == ToggleOutcome::FetchNeeded {
                if let Some(token) = self.workspace.pending_fetch_token(&path) {
                    self.queued_commands.push(AsyncCommand::FetchDirListing {
                        thread_id: self.thread_id.clone(),
                        path,
                        token,
                    });
                }
            }
        } else {
            self.queued_commands.push(AsyncCommand::FetchFile {
                thread_id: self.thread_id.clone(),
                path,
            });
        }
    }

    /// Queue a cancellation for the selected activity. The status stays
    /// untouched until a poll confirms it; repeated requests are
    /// suppressed while one is pending.
    fn cancel_selected_activity(&mut self) {
        let now = Utc::now();
        let Some(activity) = visible_activities(&self.activities, now)
            .get(self.activity_index)
            .map(|a| ((*a).clone()))
        else {
            return;
        };
        if activity.status.is_terminal() {
            self.flash_info("activity already finished");
            return;
        }
        if !self.pending_cancels.insert(activity.correlation_id.clone()) {
            self.flash_info("cancellation already requested");
            return;
        }
        self.queued_commands.push(AsyncCommand::Cancel {
            thread_id: self.thread_id.clone(),
            correlation_id: activity.correlation_id,
        });
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if near_divider(self.workspace_divider_x, mouse.column) {
                    self.workspace_pane.begin_drag(mouse.column);
                } else if near_divider(self.flow_divider_x, mouse.column) {
                    self.flow_pane.begin_drag(mouse.column);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.workspace_pane.is_dragging() {
                    self.workspace_pane.drag_to(mouse.column);
                } else if self.flow_pane.is_dragging() {
                    self.flow_pane.drag_to(mouse.column);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.workspace_pane.end_drag();
                self.flow_pane.end_drag();
            }
            _ => {}
        }
        false
    }

    fn clamp_selections(&mut self) {
        let flow_len = self.flow_len();
        if flow_len > 0 {
            self.flow_index = self.flow_index.min(flow_len - 1);
        } else {
            self.flow_index = 0;
        }
        let tree_len = self.workspace.visible().len();
        if tree_len > 0 {
            self.tree_index = self.tree_index.min(tree_len - 1);
        } else {
            self.tree_index = 0;
        }
        let activity_len = visible_activities(&self.activities, Utc::now()).len();
        if activity_len > 0 {
            self.activity_index = self.activity_index.min(activity_len - 1);
        } else {
            self.activity_index = 0;
        }
    }
}

fn panel_should_poll(store: &ThreadStore, panel: &SubAgentPanel) -> bool {
    let Some(step) = store.find_step(&panel.parent_step_id) else {
        return false;
    };
    if step.status == StepStatus::Calling {
        return true;
    }
    step.subagent
        .as_ref()
        .is_some_and(|s| !s.status.is_settled())
}

fn near_divider(divider_x: Option<u16>, column: u16) -> bool {
    divider_x.is_some_and(|x| column.abs_diff(x) <= 1)
}
