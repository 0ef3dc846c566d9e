//! Activity overlay: running commands and background tasks, plus
//! recently finished ones during their linger window.

use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::App;
use crate::theme::{activity_status_color, Theme};
use overseer_core::activity::{visible_activities, Activity, ActivityKind};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    let visible = visible_activities(&app.activities, now);

    let popup_width = 64u16.min(area.width.saturating_sub(4));
    let popup_height = 20u16.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);
    let block = Theme::block_accent()
        .title(" Activity ")
        .padding(Theme::PADDING_CARD);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(err) = &app.activity_error {
        lines.push(Line::from(Span::styled(
            format!("⚠ {err}"),
            Style::new().fg(Theme::ACCENT_RED),
        )));
    }
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "nothing running",
            Style::new().fg(Theme::TEXT_MUTED).italic(),
        )));
    }

    for (i, activity) in visible.iter().enumerate() {
        let selected = i == app.activity_index;
        push_activity_lines(app, activity, selected, now, &mut lines);
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("j/k", Style::new().fg(Theme::TEXT_KEY).bold()),
        Span::styled(" select  ", Style::new().fg(Theme::TEXT_KEY_DESC)),
        Span::styled("c", Style::new().fg(Theme::TEXT_KEY).bold()),
        Span::styled(" cancel  ", Style::new().fg(Theme::TEXT_KEY_DESC)),
        Span::styled("Esc", Style::new().fg(Theme::TEXT_KEY).bold()),
        Span::styled(" close", Style::new().fg(Theme::TEXT_KEY_DESC)),
    ]));

    let max_lines = inner.height as usize;
    if lines.len() > max_lines {
        lines.truncate(max_lines);
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn push_activity_lines(
    app: &App,
    activity: &Activity,
    selected: bool,
    now: DateTime<Utc>,
    lines: &mut Vec<Line<'static>>,
) {
    let kind_icon = match activity.kind {
        ActivityKind::Command => "$",
        ActivityKind::BackgroundTask => "⚙",
    };
    let mut spans = vec![
        Span::styled(
            if selected { "▸ " } else { "  " }.to_string(),
            Style::new().fg(Theme::ACCENT_BLUE),
        ),
        Span::styled(format!("{kind_icon} "), Style::new().fg(Theme::TEXT_MUTED)),
        Span::styled(
            activity.label.clone(),
            Style::new().fg(Theme::TEXT_PRIMARY),
        ),
        Span::styled(
            format!("  {}", activity.status.as_str()),
            Style::new().fg(activity_status_color(activity.status)),
        ),
        Span::styled(
            format!("  {}", format_elapsed(activity, now)),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
    ];
    if app.pending_cancels.contains(&activity.correlation_id) {
        spans.push(Span::styled(
            "  (cancel requested)".to_string(),
            Style::new().fg(Theme::ACCENT_YELLOW),
        ));
    }
    lines.push(Line::from(spans));

    if selected && !activity.output_tail.is_empty() {
        for line in activity.output_tail.lines().rev().take(3).collect::<Vec<_>>().into_iter().rev()
        {
            lines.push(Line::from(vec![
                Span::styled("    │ ".to_string(), Style::new().fg(Theme::TREE)),
                Span::styled(line.to_string(), Style::new().fg(Theme::TEXT_CONTENT)),
            ]));
        }
    }
}

/// Elapsed runtime for running activities; total runtime once finished.
fn format_elapsed(activity: &Activity, now: DateTime<Utc>) -> String {
    let end = activity.finished_at.unwrap_or(now);
    let secs = (end - activity.start_time).num_seconds().max(0);
    format_secs(secs)
}

fn format_secs(secs: i64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    }
}
