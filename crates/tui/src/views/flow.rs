//! Condensed action-flow pane: narration and tool steps, with the
//! structurally-last reply text of each turn left out.
//!
//! Delegation steps show their nested run inline. Once the nested thread
//! has reconciled turns those win; until then the raw live stream (text,
//! tool stubs, errors) is shown.

use crate::app::{App, Pane};
use crate::theme::{step_status_color, step_status_marker, tool_color, tool_icon, Theme};
use overseer_core::flow::{thread_flow, FlowItem};
use overseer_core::thread::{SubAgentStatus, ToolStep};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Pane::Flow;
    let block = if focused {
        Theme::block_accent()
    } else {
        Theme::block()
    }
    .title(" Flow ")
    .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = thread_flow(&app.store.turns);
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "no actions yet",
                Style::new().fg(Theme::TEXT_MUTED).italic(),
            )),
            inner,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;
    for (i, item) in items.iter().enumerate() {
        let selected = focused && i == app.flow_index;
        if selected {
            selected_line = lines.len();
        }
        push_item_lines(app, item, selected, &mut lines);
    }

    // Keep the selected item in view.
    let height = inner.height as usize;
    let scroll = if selected_line >= height {
        selected_line + 1 - height
    } else {
        0
    };
    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    frame.render_widget(paragraph, inner);
}

fn push_item_lines<'a>(
    app: &'a App,
    item: &FlowItem<'a>,
    selected: bool,
    lines: &mut Vec<Line<'a>>,
) {
    let cursor = if selected { "▸ " } else { "  " };
    match item {
        FlowItem::Narration { text, .. } => {
            let first = text.lines().next().unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(cursor, Style::new().fg(Theme::ACCENT_BLUE)),
                Span::styled("· ", Style::new().fg(Theme::TEXT_MUTED)),
                Span::styled(first, Style::new().fg(Theme::TEXT_SECONDARY)),
            ]));
        }
        FlowItem::Step { step, .. } => {
            let mut spans = vec![
                Span::styled(cursor, Style::new().fg(Theme::ACCENT_BLUE)),
                Span::styled(
                    format!("{} ", step_status_marker(step.status)),
                    Style::new().fg(step_status_color(step.status)),
                ),
                Span::styled(tool_icon(&step.name), Style::new().fg(tool_color(&step.name))),
                Span::styled(step.name.as_str(), Style::new().fg(Theme::TEXT_PRIMARY)),
            ];
            if selected {
                spans.push(Span::styled(
                    format!("  {}", step.status),
                    Style::new().fg(step_status_color(step.status)),
                ));
            }
            lines.push(Line::from(spans));
            if step.is_delegation() {
                push_subagent_lines(app, step, lines);
            }
        }
    }
}

fn push_subagent_lines<'a>(app: &'a App, step: &'a ToolStep, lines: &mut Vec<Line<'a>>) {
    let panel = app.panel_for(&step.step_id);

    // Reconciled nested turns take precedence over the live stream.
    if let Some(panel) = panel.filter(|p| !p.store.turns.is_empty()) {
        for item in thread_flow(&panel.store.turns) {
            match item {
                FlowItem::Narration { text, .. } => {
                    let first = text.lines().next().unwrap_or_default();
                    lines.push(nested_line(vec![
                        Span::styled("· ", Style::new().fg(Theme::TEXT_MUTED)),
                        Span::styled(
                            first.to_string(),
                            Style::new().fg(Theme::TEXT_SECONDARY),
                        ),
                    ]));
                }
                FlowItem::Step { step, .. } => {
                    lines.push(nested_line(vec![
                        Span::styled(
                            format!("{} ", step_status_marker(step.status)),
                            Style::new().fg(step_status_color(step.status)),
                        ),
                        Span::styled(
                            step.name.clone(),
                            Style::new().fg(Theme::TEXT_CONTENT),
                        ),
                    ]));
                }
            }
        }
        if let Some(err) = &panel.error {
            lines.push(nested_line(vec![Span::styled(
                format!("⚠ {err}"),
                Style::new().fg(Theme::ACCENT_RED),
            )]));
        }
        return;
    }

    let Some(stream) = &step.subagent else {
        return;
    };

    if !stream.description.is_empty() {
        lines.push(nested_line(vec![Span::styled(
            stream.description.as_str(),
            Style::new().fg(Theme::ACCENT_PURPLE),
        )]));
    } else if !stream.prompt.is_empty() {
        lines.push(nested_line(vec![Span::styled(
            stream.prompt.as_str(),
            Style::new().fg(Theme::ACCENT_PURPLE),
        )]));
    }

    if let Some(last) = stream.text.lines().rev().find(|l| !l.trim().is_empty()) {
        lines.push(nested_line(vec![Span::styled(
            last,
            Style::new().fg(Theme::TEXT_SECONDARY),
        )]));
    }
    for stub in &stream.tool_stubs {
        lines.push(nested_line(vec![
            Span::styled("· ", Style::new().fg(Theme::TEXT_MUTED)),
            Span::styled(stub.name.as_str(), Style::new().fg(Theme::TEXT_CONTENT)),
            Span::styled(" (pending)", Style::new().fg(Theme::TEXT_MUTED)),
        ]));
    }
    // Delegation errors are shown verbatim and never fail the parent.
    if let Some(err) = &stream.error {
        lines.push(nested_line(vec![Span::styled(
            err.as_str(),
            Style::new().fg(Theme::ACCENT_RED),
        )]));
    }
    if stream.status == SubAgentStatus::Completed {
        lines.push(nested_line(vec![Span::styled(
            "✓ sub-agent completed",
            Style::new().fg(Theme::ACCENT_GREEN),
        )]));
    }
}

fn nested_line(mut spans: Vec<Span>) -> Line {
    let mut all = vec![Span::styled("    ┆ ", Style::new().fg(Theme::TREE))];
    all.append(&mut spans);
    Line::from(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_ops::CommandResult;
    use overseer_core::config::ClientConfig;
    use overseer_core::reconcile::ThreadScope;
    use overseer_core::testing::{
        assistant_turn, running_stream, text_segment, tool_segment, tool_step, user_turn,
    };
    use overseer_core::thread::{StepStatus, ToolStub, Turn};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_to_string(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = *buffer.area();
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(90, 30);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, app, area);
            })
            .expect("draw");
        buffer_to_string(&terminal)
    }

    fn delegation_app(stream_text: &str, stubs: Vec<ToolStub>) -> App {
        let mut app = App::new("th-1", ClientConfig::default());
        let mut step = tool_step("s1", "delegate", StepStatus::Calling);
        let mut stream = running_stream(Some("sub-1"), stream_text);
        stream.tool_stubs = stubs;
        step.subagent = Some(stream);
        let turns: Vec<Turn> = vec![
            user_turn("u1", "go"),
            assistant_turn(
                "a1",
                vec![tool_segment(step), text_segment("delegating now")],
            ),
        ];
        app.apply_command_result(CommandResult::Thread {
            scope: ThreadScope::Primary,
            result: Ok(turns),
        });
        app
    }

    #[test]
    fn trailing_reply_text_is_not_in_the_flow() {
        let mut app = App::new("th-1", ClientConfig::default());
        app.store.apply_snapshot(vec![assistant_turn(
            "a1",
            vec![
                text_segment("working on it"),
                tool_segment(tool_step("s1", "run_command", StepStatus::Done)),
                text_segment("all finished"),
            ],
        )]);
        let text = draw(&app);
        assert!(text.contains("working on it"));
        assert!(text.contains("run_command"));
        assert!(!text.contains("all finished"));
    }

    #[test]
    fn live_stream_shows_until_nested_turns_arrive() {
        let app = delegation_app(
            "cloning repo\nrunning tests",
            vec![ToolStub {
                name: "run_command".to_string(),
                args: serde_json::Value::Null,
            }],
        );
        let text = draw(&app);
        assert!(text.contains("running tests"));
        assert!(text.contains("(pending)"));
    }

    #[test]
    fn reconciled_nested_turns_replace_the_live_stream() {
        let mut app = delegation_app("raw stream text", vec![]);
        app.apply_command_result(CommandResult::Thread {
            scope: ThreadScope::Nested {
                parent_step_id: "s1".to_string(),
            },
            result: Ok(vec![assistant_turn(
                "n1",
                vec![
                    text_segment("nested narration"),
                    tool_segment(tool_step("ns1", "read_file", StepStatus::Calling)),
                    text_segment("nested summary"),
                ],
            )]),
        });
        let text = draw(&app);
        assert!(text.contains("nested narration"));
        assert!(text.contains("read_file"));
        assert!(!text.contains("raw stream text"));
    }

    #[test]
    fn delegation_error_is_shown_verbatim() {
        let mut app = App::new("th-1", ClientConfig::default());
        let mut step = tool_step("s1", "delegate", StepStatus::Calling);
        let mut stream = running_stream(None, "");
        stream.error = Some("sandbox quota exceeded: 3 of 2".to_string());
        step.subagent = Some(stream);
        app.store
            .apply_snapshot(vec![assistant_turn("a1", vec![tool_segment(step)])]);
        let text = draw(&app);
        assert!(text.contains("sandbox quota exceeded: 3 of 2"));
    }
}
