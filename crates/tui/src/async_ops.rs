use std::time::Duration;

use overseer_api::SandboxStatusResponse;
use overseer_core::activity::Activity;
use overseer_core::config::ClientConfig;
use overseer_core::reconcile::ThreadScope;
use overseer_core::thread::Turn;
use overseer_core::workspace::ListingEntry;

/// Commands that require async I/O (network calls).
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Fetch a full transcript snapshot, for the primary thread or a
    /// nested delegated run.
    FetchThread {
        thread_id: String,
        scope: ThreadScope,
    },
    /// List the workspace root; the response pins the displayed root path.
    FetchRootListing { thread_id: String },
    /// List one directory for lazy tree expansion. `token` identifies the
    /// issuing fetch so superseded responses are recognized as stale.
    FetchDirListing {
        thread_id: String,
        path: String,
        token: u64,
    },
    /// Read a file for the preview pane.
    FetchFile { thread_id: String, path: String },
    FetchActivities { thread_id: String },
    FetchSandbox { thread_id: String },
    /// Request cancellation by correlation id. The effect only ever shows
    /// up through a later activity poll.
    Cancel {
        thread_id: String,
        correlation_id: String,
    },
}

/// Results returned by async commands.
pub enum CommandResult {
    Thread {
        scope: ThreadScope,
        result: Result<Vec<Turn>, String>,
    },
    RootListing(Result<(String, Vec<ListingEntry>), String>),
    DirListing {
        path: String,
        token: u64,
        result: Result<Vec<ListingEntry>, String>,
    },
    FilePreview(Result<(String, String), String>),
    Activities(Result<Vec<Activity>, String>),
    Sandbox(Result<SandboxStatusResponse, String>),
    CancelAck {
        correlation_id: String,
        result: Result<(), String>,
    },
}

fn make_client(config: &ClientConfig) -> Result<overseer_api_client::ApiClient, String> {
    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let mut client = overseer_api_client::ApiClient::new(&config.server.url, timeout)
        .map_err(|e| format!("Failed to create HTTP client: {e}"))?;
    if !config.server.api_key.is_empty() {
        client.set_auth(config.server.api_key.clone());
    }
    Ok(client)
}

pub async fn execute(cmd: AsyncCommand, config: &ClientConfig) -> CommandResult {
    match cmd {
        AsyncCommand::FetchThread { thread_id, scope } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .get_thread(&thread_id)
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok(resp.turns)
            }
            .await;
            CommandResult::Thread { scope, result }
        }

        AsyncCommand::FetchRootListing { thread_id } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .list_dir(&thread_id, None)
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok((resp.path, resp.entries))
            }
            .await;
            CommandResult::RootListing(result)
        }

        AsyncCommand::FetchDirListing {
            thread_id,
            path,
            token,
        } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .list_dir(&thread_id, Some(&path))
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok(resp.entries)
            }
            .await;
            CommandResult::DirListing {
                path,
                token,
                result,
            }
        }

        AsyncCommand::FetchFile { thread_id, path } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .read_file(&thread_id, &path)
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok((resp.path, resp.content))
            }
            .await;
            CommandResult::FilePreview(result)
        }

        AsyncCommand::FetchActivities { thread_id } => {
            let result = async {
                let client = make_client(config)?;
                let resp = client
                    .list_activities(&thread_id)
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok(resp.activities)
            }
            .await;
            CommandResult::Activities(result)
        }

        AsyncCommand::FetchSandbox { thread_id } => {
            let result = async {
                let client = make_client(config)?;
                client
                    .sandbox_status(&thread_id)
                    .await
                    .map_err(|e| format!("{e}"))
            }
            .await;
            CommandResult::Sandbox(result)
        }

        AsyncCommand::Cancel {
            thread_id,
            correlation_id,
        } => {
            let result = async {
                let client = make_client(config)?;
                client
                    .cancel(&thread_id, &correlation_id)
                    .await
                    .map_err(|e| format!("{e}"))?;
                Ok(())
            }
            .await;
            CommandResult::CancelAck {
                correlation_id,
                result,
            }
        }
    }
}
