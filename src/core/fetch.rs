//! Monitor page download.

use std::time::Duration;

use crate::error::{MonitorError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Anything that can produce the monitor page text for a URL
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("Fetching monitor page {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::transport(format!("HTTP {} from {}", status, url)));
        }

        // decodes using the response charset, replacing invalid sequences
        let body = response.text()?;
        log::debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
