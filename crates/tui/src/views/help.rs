use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

pub fn render(frame: &mut Frame, area: Rect) {
    // Center the help overlay
    let popup_width = 58u16.min(area.width.saturating_sub(4));
    let popup_height = 26u16.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Theme::block_accent()
        .title(" Keyboard Shortcuts ")
        .padding(Theme::PADDING_CARD);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::new().fg(Theme::ACCENT_YELLOW).bold();
    let desc_style = Style::new().fg(Theme::TEXT_CONTENT);
    let header_style = Style::new().fg(Theme::ACCENT_BLUE).bold();
    let close_hint_line = Line::from(Span::styled(
        "Press any key to close",
        Style::new().fg(Color::DarkGray),
    ));

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, key_style),
            Span::styled(desc, desc_style),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled("── Global ──", header_style)),
        entry("  Tab       ", "Cycle focus (Transcript/Flow/Workspace)"),
        entry("  r         ", "Refresh (restarts stopped polling)"),
        entry("  a         ", "Activity overlay"),
        entry("  </>       ", "Resize focused pane"),
        entry("  ?         ", "Toggle this help"),
        entry("  q         ", "Quit"),
        Line::raw(""),
        Line::from(Span::styled("── Transcript ──", header_style)),
        entry("  j/k       ", "Scroll"),
        entry("  g/G       ", "Jump to top/bottom"),
        entry("  PgDn/PgUp ", "Scroll 10 lines"),
        Line::raw(""),
        Line::from(Span::styled("── Flow ──", header_style)),
        entry("  j/k       ", "Select item"),
        entry("  Enter/e   ", "Expand/collapse step detail"),
        Line::raw(""),
        Line::from(Span::styled("── Workspace ──", header_style)),
        entry("  j/k       ", "Select entry"),
        entry("  Enter     ", "Expand dir / preview file"),
        Line::raw(""),
        Line::from(Span::styled("── Activity ──", header_style)),
        entry("  c         ", "Request cancellation"),
        Line::raw(""),
        close_hint_line.clone(),
    ];

    // Keep close hint visible even when the help body exceeds the popup height.
    let max_lines = inner.height as usize;
    if max_lines == 0 {
        return;
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = close_hint_line;
        }
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::render;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::Terminal;

    fn buffer_to_string(buffer: &Buffer) -> String {
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

    #[test]
    fn render_shows_shortcuts_and_close_hint() {
        let backend = TestBackend::new(100, 34);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area);
            })
            .expect("draw");

        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains("Keyboard Shortcuts"));
        assert!(text.contains("Workspace"));
        assert!(text.contains("Press any key to close"));
    }

    #[test]
    fn render_handles_small_terminal_area() {
        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                render(frame, Rect::new(0, 0, 30, 10));
            })
            .expect("draw");

        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains("Keyboard"));
    }
}
