use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use overseer_tui::{config, run, RunOptions};

/// Terminal UI for supervising a remote agent run.
#[derive(Parser)]
#[command(name = "overseer-tui", version, about)]
struct Cli {
    /// Thread id of the run to supervise
    thread: String,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// API key (overrides the config file)
    #[arg(long)]
    api_key: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(RunOptions {
        thread_id: cli.thread,
        server_url: cli.server,
        api_key: cli.api_key,
    })
}

/// Log to a file when RUST_LOG is set; stderr belongs to the terminal UI.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_err() {
        return;
    }
    let Ok(path) = config::log_file_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::File::options().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}
