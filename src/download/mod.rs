//! Module page download
//!
//! Fetches data dictionary pages over HTTP(S).

use tracing::{debug, info};

/// Error downloading a module page
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid response code {status} from {url}")]
    InvalidStatus { url: String, status: u16 },
    #[error("Empty response body from {0}")]
    EmptyBody(String),
}

/// HTTP client for module pages
pub struct ModuleDownloader {
    client: reqwest::Client,
}

impl Default for ModuleDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (proxy, timeouts, user agent)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download a page body.
    ///
    /// Only a `200 OK` response with a non-empty body succeeds.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use datahub_schema::download::ModuleDownloader;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let page = ModuleDownloader::new()
    ///     .download("https://example.com/data-hub/grades")
    ///     .await?;
    /// println!("{} bytes", page.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        debug!(url = %url, "Downloading module page");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DownloadError::InvalidStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            DownloadError::NetworkError(format!("Failed to read body from {}: {}", url, e))
        })?;
        if body.is_empty() {
            return Err(DownloadError::EmptyBody(url.to_string()));
        }

        info!(url = %url, bytes = body.len(), "Downloaded module page");
        Ok(body.to_vec())
    }
}
