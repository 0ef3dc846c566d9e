use std::time::Instant;

use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{App, FlashLevel};
use crate::theme::{sandbox_badge, Theme};
use crate::views::{activity, flow, help, transcript, workspace};
use overseer_core::activity::visible_activities;

pub fn render(frame: &mut Frame, app: &mut App) {
    let full = frame.area();
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(full);

    render_header(frame, app, header_area);

    // Body: transcript fills whatever the two side panes leave over.
    let flow_width = app.flow_pane.width().min(body_area.width / 2);
    let workspace_width = app
        .workspace_pane
        .width()
        .min(body_area.width.saturating_sub(flow_width) / 2);
    let [transcript_area, flow_area, workspace_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(flow_width),
        Constraint::Length(workspace_width),
    ])
    .areas(body_area);

    // Remember divider columns for mouse hit tests next tick.
    app.flow_divider_x = Some(flow_area.x);
    app.workspace_divider_x = Some(workspace_area.x);

    transcript::render(frame, app, transcript_area);
    flow::render(frame, app, flow_area);
    workspace::render(frame, app, workspace_area);

    render_footer(frame, footer_area);

    if app.show_activity_overlay {
        activity::render(frame, app, full);
    }
    if app.show_help {
        help::render(frame, full);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Theme::block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![
        Span::styled(" overseer ", Style::new().fg(Theme::ACCENT_ORANGE).bold()),
        Span::styled(" ", Style::new()),
        Span::styled(
            app.thread_id.as_str(),
            Style::new().fg(Theme::ACCENT_BLUE),
        ),
    ];

    if let Some(sandbox) = &app.sandbox {
        let (label, bg) = sandbox_badge(sandbox.state);
        spans.push(Span::styled("  ", Style::new()));
        spans.push(Span::styled(
            format!(" {label} "),
            Style::new().fg(Color::Black).bg(bg).bold(),
        ));
    }

    let running = visible_activities(&app.activities, Utc::now())
        .iter()
        .filter(|a| !a.status.is_terminal())
        .count();
    if running > 0 {
        spans.push(Span::styled(
            format!("  {running} active"),
            Style::new().fg(Theme::ACCENT_YELLOW),
        ));
    }

    if app.transcript_poller.is_stopped() {
        spans.push(Span::styled(
            "  polling stopped (r to resume)",
            Style::new().fg(Theme::ACCENT_RED),
        ));
    }

    if let Some((message, level)) = app.visible_flash(Instant::now()) {
        let color = match level {
            FlashLevel::Info => Theme::ACCENT_GREEN,
            FlashLevel::Error => Theme::ACCENT_RED,
        };
        spans.push(Span::styled(
            format!("  {message}"),
            Style::new().fg(color).italic(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hint = |key: &'static str, desc: &'static str| {
        [
            Span::styled(key, Style::new().fg(Theme::TEXT_KEY).bold()),
            Span::styled(desc, Style::new().fg(Theme::TEXT_KEY_DESC)),
        ]
    };
    let mut spans = vec![Span::raw(" ")];
    for pair in [
        hint("Tab", " panes  "),
        hint("j/k", " move  "),
        hint("Enter", " open  "),
        hint("a", " activity  "),
        hint("r", " refresh  "),
        hint("?", " help  "),
        hint("q", " quit"),
    ] {
        spans.extend(pair);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
