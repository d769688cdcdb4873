use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ReaderError, Result};

/// Raw page as returned by a successful GET.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub body: String,
}

/// Issues one GET per URL. No retries, redirects follow reqwest's default policy.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl Fetcher {
    /// Builds the underlying client. With `timeout = None` a request may wait forever.
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(ReaderError::Client)?;

        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        Self::new(config.fetch_timeout(), config.fetch.user_agent.as_deref())
    }

    /// Fetches `url`, succeeding only on status 200.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        debug!(url, "fetch: sending GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(url, status, "fetch: unexpected http status");
            return Err(ReaderError::Fetch { url: url.to_string(), status });
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;
        debug!(url, bytes = body.len(), "fetch: body received");

        Ok(FetchResult { status, body })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> ReaderError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => {
                warn!(url, seconds = timeout.as_secs(), "fetch: timed out");
                ReaderError::Timeout { url: url.to_string(), seconds: timeout.as_secs() }
            }
            _ => {
                warn!(url, error = %err, "fetch: network error");
                ReaderError::Network { url: url.to_string(), source: err }
            }
        }
    }
}
