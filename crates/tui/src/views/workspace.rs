//! Lazy workspace file tree with a file preview pane below it.

use crate::app::{App, Pane};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let has_preview = app.workspace.preview.is_some();
    let (tree_area, preview_area) = if has_preview {
        let [tree, preview] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
        (tree, Some(preview))
    } else {
        (area, None)
    };

    render_tree(frame, app, tree_area);
    if let Some(preview_area) = preview_area {
        render_preview(frame, app, preview_area);
    }
}

fn render_tree(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Pane::Workspace;
    let title = match app.workspace.root_path() {
        Some(root) => format!(" {root} "),
        None => " Workspace ".to_string(),
    };
    let block = if focused {
        Theme::block_accent()
    } else {
        Theme::block()
    }
    .title(title)
    .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(err) = &app.workspace_error {
        lines.push(Line::from(Span::styled(
            format!("⚠ {err}"),
            Style::new().fg(Theme::ACCENT_RED),
        )));
    }

    let visible = app.workspace.visible();
    if visible.is_empty() && app.workspace_error.is_none() {
        lines.push(Line::from(Span::styled(
            "loading workspace...",
            Style::new().fg(Theme::TEXT_MUTED).italic(),
        )));
    }

    let height = inner.height as usize;
    let skip = if height > 0 && app.tree_index >= height {
        app.tree_index + 1 - height
    } else {
        0
    };

    for (row, (depth, node)) in visible.iter().enumerate().skip(skip) {
        let selected = focused && row == app.tree_index;
        let indent = "  ".repeat(*depth);
        let marker = if !node.is_dir {
            "  "
        } else if node.loading {
            "… "
        } else if node.expanded {
            "▾ "
        } else {
            "▸ "
        };
        let name_style = if node.is_dir {
            Style::new().fg(Theme::ACCENT_BLUE)
        } else {
            Style::new().fg(Theme::TEXT_CONTENT)
        };
        let name_style = if selected {
            name_style.bold().fg(Theme::TEXT_PRIMARY)
        } else {
            name_style
        };

        let mut spans = vec![
            Span::styled(if selected { "▸" } else { " " }, Style::new().fg(Theme::ACCENT_BLUE)),
            Span::styled(indent, Style::new()),
            Span::styled(marker, Style::new().fg(Theme::TREE)),
            Span::styled(node.name.as_str(), name_style),
        ];
        if let Some(size) = node.size {
            spans.push(Span::styled(
                format!("  {}", format_size(size)),
                Style::new().fg(Theme::TEXT_MUTED),
            ));
        }
        // A loaded-empty directory is distinguishable from an unfetched one.
        if node.is_dir && node.expanded && node.children.as_ref().is_some_and(Vec::is_empty) {
            spans.push(Span::styled(
                "  (empty)",
                Style::new().fg(Theme::TEXT_MUTED),
            ));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let Some(preview) = &app.workspace.preview else {
        return;
    };
    let title = truncate_middle(&preview.path, area.width.saturating_sub(4) as usize);
    let block = Theme::block_dim()
        .title(format!(" {title} "))
        .padding(Theme::PADDING_COMPACT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = preview
        .content
        .lines()
        .take(inner.height as usize)
        .map(|l| Line::from(Span::styled(l, Style::new().fg(Theme::TEXT_CONTENT))))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{size}B")
    } else if size < 1024 * 1024 {
        format!("{}K", size / 1024)
    } else {
        format!("{:.1}M", size as f64 / (1024.0 * 1024.0))
    }
}

fn truncate_middle(text: &str, max: usize) -> String {
    if text.width() <= max || max < 5 {
        return text.to_string();
    }
    let keep = max.saturating_sub(1) / 2;
    let head: String = text.chars().take(keep).collect();
    let tail: String = text
        .chars()
        .rev()
        .take(keep)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::async_ops::CommandResult;
    use overseer_core::config::ClientConfig;
    use overseer_core::workspace::ListingEntry;
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
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, app, area);
            })
            .expect("draw");
        buffer_to_string(&terminal)
    }

    fn loaded_app() -> App {
        let mut app = App::new("th-1", ClientConfig::default());
        app.apply_command_result(CommandResult::RootListing(Ok((
            "/work".to_string(),
            vec![
                ListingEntry {
                    name: "src".to_string(),
                    is_dir: true,
                    size: None,
                },
                ListingEntry {
                    name: "README.md".to_string(),
                    is_dir: false,
                    size: Some(2048),
                },
            ],
        ))));
        app
    }

    #[test]
    fn root_listing_shows_entries_and_root_title() {
        let app = loaded_app();
        let text = draw(&app);
        assert!(text.contains("/work"));
        assert!(text.contains("src"));
        assert!(text.contains("README.md"));
        assert!(text.contains("2K"));
    }

    #[test]
    fn preview_pane_appears_once_a_file_is_loaded() {
        let mut app = loaded_app();
        app.apply_command_result(CommandResult::FilePreview(Ok((
            "/work/README.md".to_string(),
            "# Hello\nworld".to_string(),
        ))));
        let text = draw(&app);
        assert!(text.contains("# Hello"));
        assert!(text.contains("world"));
    }

    #[test]
    fn loaded_empty_dir_is_marked() {
        let mut app = loaded_app();
        app.workspace.toggle("/work/src");
        let token = app.workspace.pending_fetch_token("/work/src").unwrap();
        app.apply_command_result(CommandResult::DirListing {
            path: "/work/src".to_string(),
            token,
            result: Ok(vec![]),
        });
        let text = draw(&app);
        assert!(text.contains("(empty)"));
    }

    #[test]
    fn format_size_breaks_at_unit_boundaries() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(4096), "4K");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0M");
    }
}
