use std::time::Duration;

use anyhow::{bail, Result};
use tracing::warn;

use overseer_api::*;

/// Typed HTTP client for the overseer backend.
///
/// Every read endpoint is idempotent and safe to poll; cancellation is the
/// only write and is fire-and-forget from the caller's perspective.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        req
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.get("/health").send().await?;
        parse_response(resp).await
    }

    // ── Transcript ────────────────────────────────────────────────────────

    /// Fetch the full transcript snapshot for a thread.
    pub async fn get_thread(&self, thread_id: &str) -> Result<ThreadSnapshotResponse> {
        let resp = self
            .get(&format!("/threads/{thread_id}"))
            .send()
            .await
            .inspect_err(|e| warn!("thread fetch failed for {thread_id}: {e}"))?;
        parse_response(resp).await
    }

    // ── Workspace ─────────────────────────────────────────────────────────

    /// List a directory in the run's sandbox. `path = None` lists the
    /// workspace root and returns its resolved absolute path.
    pub async fn list_dir(
        &self,
        thread_id: &str,
        path: Option<&str>,
    ) -> Result<DirListingResponse> {
        let mut req = self.get(&format!("/threads/{thread_id}/files"));
        if let Some(path) = path {
            req = req.query(&[("path", path)]);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    /// Read a file's text content for preview.
    pub async fn read_file(&self, thread_id: &str, path: &str) -> Result<FileReadResponse> {
        let resp = self
            .get(&format!("/threads/{thread_id}/file"))
            .query(&[("path", path)])
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Activities ────────────────────────────────────────────────────────

    pub async fn list_activities(&self, thread_id: &str) -> Result<ActivityListResponse> {
        let resp = self
            .get(&format!("/threads/{thread_id}/activities"))
            .send()
            .await?;
        parse_response(resp).await
    }

    /// Request cancellation by correlation id. The acknowledgement says the
    /// intent was received; the status change shows up in a later poll.
    pub async fn cancel(&self, thread_id: &str, correlation_id: &str) -> Result<OkResponse> {
        let mut req = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/cancel")))
            .json(&CancelRequest {
                correlation_id: correlation_id.to_string(),
            });
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .inspect_err(|e| warn!("cancel request failed for {correlation_id}: {e}"))?;
        parse_response(resp).await
    }

    // ── Sandbox lifecycle ─────────────────────────────────────────────────

    pub async fn sandbox_status(&self, thread_id: &str) -> Result<SandboxStatusResponse> {
        let resp = self
            .get(&format!("/threads/{thread_id}/sandbox"))
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{status}: {body}");
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8787/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8787");
        assert_eq!(client.url("/health"), "http://localhost:8787/api/health");
    }
}
