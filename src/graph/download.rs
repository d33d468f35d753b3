//! One-shot dataset retrieval.
//!
//! The article graph lives in a remote workspace and is exported once per
//! deployment via the workspace export API, which returns the file content
//! base64-encoded inside a JSON envelope. A file that already exists
//! locally is never re-downloaded; the local path is the cache key.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::Deserialize;
use tracing::info;

use super::{GraphError, GraphResult};

/// Timeout applied to the export request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the workspace export API.
pub struct WorkspaceExport {
    http: reqwest::Client,
    host: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    content: Option<String>,
}

impl WorkspaceExport {
    /// Create a new export client.
    ///
    /// # Arguments
    /// * `host` - Workspace hostname, without scheme
    /// * `token` - Access token for the workspace API
    pub fn new(host: String, token: String) -> GraphResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GraphError::DownloadError(e.to_string()))?;
        Ok(Self { http, host, token })
    }

    /// Download `workspace_path` to `local_path` unless the local file
    /// already exists.
    ///
    /// Returns `true` if a download happened, `false` if the cached file
    /// was kept.
    pub async fn download(
        &self,
        workspace_path: &str,
        local_path: impl AsRef<Path>,
    ) -> GraphResult<bool> {
        let local_path = local_path.as_ref();
        if tokio::fs::try_exists(local_path).await? {
            info!(path = %local_path.display(), "dataset already present, skipping download");
            return Ok(false);
        }

        let url = format!("https://{}/api/2.0/workspace/export", self.host);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("path", workspace_path), ("format", "SOURCE")])
            .send()
            .await
            .map_err(|e| GraphError::DownloadError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::DownloadError(format!(
                "export API returned {status}: {body}"
            )));
        }

        let export: ExportResponse = response
            .json()
            .await
            .map_err(|e| GraphError::DownloadError(e.to_string()))?;
        let encoded = export.content.ok_or_else(|| {
            GraphError::DownloadError("'content' field missing in export response".to_string())
        })?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| GraphError::DownloadError(format!("invalid base64 content: {e}")))?;

        tokio::fs::write(local_path, &decoded).await?;
        info!(path = %local_path.display(), bytes = decoded.len(), "dataset downloaded");
        Ok(true)
    }
}
