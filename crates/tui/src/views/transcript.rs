//! Full conversation pane: every turn, with tool steps inline.

use crate::app::{App, Pane};
use crate::theme::{step_status_color, step_status_marker, tool_color, tool_icon, Theme};
use overseer_core::thread::{StepStatus, ToolStep, Turn, TurnBody};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const MAX_ARG_LINES: usize = 8;
const MAX_RESULT_LINES: usize = 14;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = if app.focus == Pane::Transcript {
        Theme::block_accent()
    } else {
        Theme::block()
    }
    .title(" Transcript ")
    .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let scroll = {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(err) = &app.transcript_error {
            lines.push(Line::from(Span::styled(
                format!("⚠ {err}"),
                Style::new().fg(Theme::ACCENT_RED),
            )));
        }
        for turn in &app.store.turns {
            push_turn_lines(app, turn, &mut lines);
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "waiting for transcript...",
                Style::new().fg(Theme::TEXT_MUTED).italic(),
            )));
        }

        // Clamp the scroll so `G` can park at the bottom with u16::MAX.
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let max_scroll = total.saturating_sub(inner.height);
        let scroll = app.transcript_scroll.min(max_scroll);
        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
        scroll
    };
    app.transcript_scroll = scroll;
}

fn push_turn_lines<'a>(app: &'a App, turn: &'a Turn, lines: &mut Vec<Line<'a>>) {
    if !lines.is_empty() {
        lines.push(Line::raw(""));
    }
    match &turn.body {
        TurnBody::User { text } => {
            lines.push(Line::from(Span::styled(
                "You",
                Style::new().fg(Theme::ROLE_USER).bold(),
            )));
            for line in text.lines() {
                lines.push(Line::from(Span::styled(
                    line,
                    Style::new().fg(Theme::TEXT_PRIMARY),
                )));
            }
        }
        TurnBody::Assistant { segments } => {
            lines.push(Line::from(Span::styled(
                "Agent",
                Style::new().fg(Theme::ROLE_AGENT).bold(),
            )));
            for segment in segments {
                match segment {
                    overseer_core::thread::Segment::Text { content } => {
                        for line in content.lines() {
                            lines.push(Line::from(Span::styled(
                                line,
                                Style::new().fg(Theme::TEXT_CONTENT),
                            )));
                        }
                    }
                    overseer_core::thread::Segment::Tool { step } => {
                        push_step_lines(app, step, lines);
                    }
                }
            }
        }
    }
}

fn push_step_lines<'a>(app: &'a App, step: &'a ToolStep, lines: &mut Vec<Line<'a>>) {
    lines.push(Line::from(vec![
        Span::styled(tool_icon(&step.name), Style::new().fg(tool_color(&step.name))),
        Span::styled(step.name.as_str(), Style::new().fg(Theme::TEXT_PRIMARY).bold()),
        Span::raw("  "),
        Span::styled(
            format!("{} {}", step_status_marker(step.status), step.status),
            Style::new().fg(step_status_color(step.status)),
        ),
    ]));

    if step.status == StepStatus::Cancelled {
        lines.push(detail_line(
            "cancelled before completion".to_string(),
            Theme::TEXT_MUTED,
        ));
        return;
    }

    if !app.step_expanded(step) {
        return;
    }

    if !step.args.is_null() {
        let pretty =
            serde_json::to_string_pretty(&step.args).unwrap_or_else(|_| step.args.to_string());
        push_clipped(lines, &pretty, MAX_ARG_LINES, Theme::TEXT_SECONDARY);
    }
    if let Some(result) = &step.result {
        push_clipped(lines, result, MAX_RESULT_LINES, Theme::TEXT_CONTENT);
    }
}

fn push_clipped(lines: &mut Vec<Line>, text: &str, max: usize, color: Color) {
    let total = text.lines().count();
    for line in text.lines().take(max) {
        lines.push(detail_line(line.to_string(), color));
    }
    if total > max {
        lines.push(detail_line(
            format!("... {} more lines", total - max),
            Theme::TEXT_MUTED,
        ));
    }
}

fn detail_line(text: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled("  │ ", Style::new().fg(Theme::TREE)),
        Span::styled(text, Style::new().fg(color)),
    ])
}
