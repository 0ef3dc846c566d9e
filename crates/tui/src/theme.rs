use overseer_api::SandboxState;
use overseer_core::activity::ActivityStatus;
use overseer_core::thread::StepStatus;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Padding};

pub struct Theme;

impl Theme {
    // ── Border ───────────────────────────────────────────────────────
    pub const BORDER_DIM: Color = Color::DarkGray;
    pub const BORDER_NORMAL: Color = Color::Rgb(60, 65, 80);
    pub const BORDER_ACCENT: Color = Color::Rgb(100, 180, 240);

    // ── Text hierarchy ───────────────────────────────────────────────
    pub const TEXT_PRIMARY: Color = Color::White;
    pub const TEXT_SECONDARY: Color = Color::Rgb(140, 145, 160);
    pub const TEXT_MUTED: Color = Color::Rgb(80, 85, 100);
    pub const TEXT_CONTENT: Color = Color::Rgb(170, 175, 190);
    pub const TEXT_HINT: Color = Color::Rgb(60, 65, 80);

    // ── Key style (for footer hints) ─────────────────────────────────
    pub const TEXT_KEY: Color = Color::Rgb(140, 145, 160);
    pub const TEXT_KEY_DESC: Color = Color::DarkGray;

    // ── Accent ───────────────────────────────────────────────────────
    pub const ACCENT_BLUE: Color = Color::Rgb(100, 180, 240);
    pub const ACCENT_GREEN: Color = Color::Rgb(80, 200, 120);
    pub const ACCENT_RED: Color = Color::Rgb(220, 80, 80);
    pub const ACCENT_YELLOW: Color = Color::Rgb(220, 180, 60);
    pub const ACCENT_PURPLE: Color = Color::Rgb(180, 140, 220);
    pub const ACCENT_ORANGE: Color = Color::Rgb(217, 119, 80);

    // ── Role colors ──────────────────────────────────────────────────
    pub const ROLE_USER: Color = Color::Rgb(80, 180, 100);
    pub const ROLE_AGENT: Color = Color::Rgb(100, 140, 220);

    // ── Tree / gutter ────────────────────────────────────────────────
    pub const TREE: Color = Color::Rgb(70, 75, 90);

    // ── Badge backgrounds ────────────────────────────────────────────
    pub const BADGE_RUNNING: Color = Color::Rgb(80, 160, 240);
    pub const BADGE_PAUSED: Color = Color::Rgb(220, 180, 60);
    pub const BADGE_DESTROYED: Color = Color::Rgb(100, 105, 120);

    // ── Padding ──────────────────────────────────────────────────────
    pub const PADDING_CARD: Padding = Padding::new(2, 2, 1, 1);
    pub const PADDING_COMPACT: Padding = Padding::new(1, 1, 0, 0);

    // ── Block helpers ────────────────────────────────────────────────

    pub fn block() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_NORMAL))
    }

    pub fn block_dim() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_DIM))
    }

    pub fn block_accent() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_ACCENT))
    }
}

// ── Status colors / markers ──────────────────────────────────────────

pub fn step_status_color(status: StepStatus) -> Color {
    match status {
        StepStatus::Calling => Theme::ACCENT_YELLOW,
        StepStatus::Done => Theme::ACCENT_GREEN,
        StepStatus::Error => Theme::ACCENT_RED,
        StepStatus::Cancelled => Theme::TEXT_MUTED,
    }
}

pub fn step_status_marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Calling => "●",
        StepStatus::Done => "✓",
        StepStatus::Error => "✗",
        StepStatus::Cancelled => "⊘",
    }
}

pub fn activity_status_color(status: ActivityStatus) -> Color {
    match status {
        ActivityStatus::Running => Theme::ACCENT_YELLOW,
        ActivityStatus::Done => Theme::ACCENT_GREEN,
        ActivityStatus::Error => Theme::ACCENT_RED,
        ActivityStatus::Cancelled => Theme::TEXT_MUTED,
    }
}

pub fn sandbox_badge(state: SandboxState) -> (&'static str, Color) {
    match state {
        SandboxState::Running => ("RUNNING", Theme::BADGE_RUNNING),
        SandboxState::Paused => ("PAUSED", Theme::BADGE_PAUSED),
        SandboxState::Destroyed => ("DESTROYED", Theme::BADGE_DESTROYED),
        SandboxState::Unknown => ("UNKNOWN", Theme::BADGE_DESTROYED),
    }
}

// ── Tool icons ───────────────────────────────────────────────────────

pub fn tool_icon(tool: &str) -> &'static str {
    match tool {
        "run_command" => " $ ",
        "read_file" => " R ",
        "write_file" | "edit_file" | "apply_patch" => " W ",
        "search" | "grep" => " / ",
        "delegate" | "spawn_agent" | "subagent" => " ⇉ ",
        "web_fetch" => " ↓ ",
        _ => " · ",
    }
}

pub fn tool_color(tool: &str) -> Color {
    match tool {
        "run_command" => Theme::ACCENT_ORANGE,
        "read_file" => Theme::ACCENT_BLUE,
        "write_file" | "edit_file" | "apply_patch" => Theme::ACCENT_GREEN,
        "search" | "grep" => Theme::ACCENT_YELLOW,
        "delegate" | "spawn_agent" | "subagent" => Theme::ACCENT_PURPLE,
        _ => Theme::TEXT_SECONDARY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_status_colors_distinguish_terminal_outcomes() {
        assert_ne!(
            step_status_color(StepStatus::Done),
            step_status_color(StepStatus::Error)
        );
        assert_ne!(
            step_status_color(StepStatus::Done),
            step_status_color(StepStatus::Cancelled)
        );
    }

    #[test]
    fn tool_icon_maps_known_and_unknown_tools() {
        assert_eq!(tool_icon("run_command"), " $ ");
        assert_eq!(tool_icon("delegate"), " ⇉ ");
        assert_eq!(tool_icon("mystery_tool"), " · ");
    }

    #[test]
    fn write_class_tools_share_an_icon() {
        assert_eq!(tool_icon("write_file"), tool_icon("apply_patch"));
        assert_eq!(tool_color("write_file"), tool_color("edit_file"));
    }

    #[test]
    fn sandbox_badge_labels_match_state() {
        assert_eq!(sandbox_badge(SandboxState::Running).0, "RUNNING");
        assert_eq!(sandbox_badge(SandboxState::Destroyed).0, "DESTROYED");
    }
}
