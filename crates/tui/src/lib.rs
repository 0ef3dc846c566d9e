mod app;
mod async_ops;
pub mod config;
mod layout;
mod poll;
mod theme;
mod ui;
mod views;

use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;

use app::App;
use async_ops::CommandResult;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub thread_id: String,
    pub server_url: Option<String>,
    pub api_key: Option<String>,
}

/// Launch the TUI against one run's thread.
pub fn run(options: RunOptions) -> Result<()> {
    let mouse_capture_enabled = env_flag_enabled("OVERSEER_TUI_MOUSE_CAPTURE");

    let mut config = config::load_client_config();
    if let Some(url) = options.server_url {
        config.server.url = url;
    }
    if let Some(api_key) = options.api_key {
        config.server.api_key = api_key;
    }

    let mut app = App::new(options.thread_id, config);

    // Terminal setup
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    if mouse_capture_enabled {
        stdout().execute(EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = event_loop(&mut terminal, &mut app, mouse_capture_enabled);

    // Restore terminal
    disable_raw_mode()?;
    if mouse_capture_enabled {
        stdout().execute(DisableMouseCapture)?;
    }
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    mouse_capture_enabled: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let (tx, rx) = mpsc::channel::<CommandResult>();

    loop {
        // ── Apply finished background requests ───────────────────────
        while let Ok(result) = rx.try_recv() {
            app.apply_command_result(result);
        }

        // ── Dispatch everything that is due this tick ────────────────
        for cmd in app.due_commands(Instant::now()) {
            let tx = tx.clone();
            let config = app.config.clone();
            rt.spawn(async move {
                let result = async_ops::execute(cmd, &config).await;
                let _ = tx.send(result);
            });
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if app.handle_key(key.code) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    if !mouse_capture_enabled {
                        continue;
                    }
                    if app.handle_mouse(mouse) {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::env_flag_enabled;

    #[test]
    fn env_flag_enabled_defaults_false() {
        let key = "OVERSEER_TUI_FLAG_TEST_FALSE";
        std::env::remove_var(key);
        assert!(!env_flag_enabled(key));
    }

    #[test]
    fn env_flag_enabled_accepts_true_values() {
        let key = "OVERSEER_TUI_FLAG_TEST_TRUE";
        std::env::set_var(key, "true");
        assert!(env_flag_enabled(key));
        std::env::set_var(key, "1");
        assert!(env_flag_enabled(key));
        std::env::remove_var(key);
    }
}
