use async_trait::async_trait;
use log::debug;

use crate::error::ExtractError;

/// Plain GET of a caption payload
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ExtractError>;
}

/// Fetcher backed by a shared `reqwest` client. No auth, no custom headers.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptionFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        debug!("Fetching caption payload: {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractError::FetchError(status.as_u16()));
        }

        resp.text().await.map_err(|e| ExtractError::Network(e.to_string()))
    }
}
