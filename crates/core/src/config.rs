//! Shared client configuration types.
//!
//! The TUI reads/writes `overseer.toml` using these types; file I/O and CLI
//! overrides live in the TUI crate.

use serde::{Deserialize, Serialize};

/// Top-level client configuration (persisted as `overseer.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Fixed poll cadences. Intervals do not back off: a scope polls at its
/// interval while active and stops entirely once settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_transcript_ms")]
    pub transcript_ms: u64,
    #[serde(default = "default_subagent_ms")]
    pub subagent_ms: u64,
    #[serde(default = "default_activity_ms")]
    pub activity_ms: u64,
    #[serde(default = "default_sandbox_ms")]
    pub sandbox_ms: u64,
    /// Consecutive failures after which a scope stops until manually refreshed
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            transcript_ms: default_transcript_ms(),
            subagent_ms: default_subagent_ms(),
            activity_ms: default_activity_ms(),
            sandbox_ms: default_sandbox_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_server_url() -> String {
    "http://localhost:8787".to_string()
}
fn default_request_timeout() -> u64 {
    15
}
fn default_transcript_ms() -> u64 {
    1500
}
fn default_subagent_ms() -> u64 {
    1000
}
fn default_activity_ms() -> u64 {
    2000
}
fn default_sandbox_ms() -> u64 {
    10_000
}
fn default_max_consecutive_failures() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_empty_toml() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.url, "http://localhost:8787");
        assert_eq!(config.poll.subagent_ms, 1000);
        assert_eq!(config.poll.max_consecutive_failures, 5);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [server]
            url = "https://agents.example.com"

            [poll]
            transcript_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.server.url, "https://agents.example.com");
        assert_eq!(config.poll.transcript_ms, 500);
        assert_eq!(config.poll.activity_ms, 2000);
    }
}
