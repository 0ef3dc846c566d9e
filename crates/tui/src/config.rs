use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

// Re-export shared config types from core
pub use overseer_core::config::{ClientConfig, PollSettings, ServerSettings};

// ── File I/O ────────────────────────────────────────────────────────────

pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("overseer"))
}

/// Load client config from `~/.config/overseer/overseer.toml`.
/// Missing or unreadable files fall back to defaults.
pub fn load_client_config() -> ClientConfig {
    let Ok(dir) = config_dir() else {
        return ClientConfig::default();
    };
    load_client_config_from(&dir.join("overseer.toml"))
}

pub fn load_client_config_from(path: &Path) -> ClientConfig {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default()
}

/// Save client config to `~/.config/overseer/overseer.toml`.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("overseer.toml");
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Log file path for the optional debug log.
pub fn log_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tui.log"))
}
