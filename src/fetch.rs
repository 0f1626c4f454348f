use async_trait::async_trait;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config::FetcherConfig;
use crate::utils::error::{Result, WatchError};

/// Fetches the monitored page as raw markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP fetcher. No rendering, no script execution: the monitored
/// listing is served as static markup.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    retry_attempts: usize,
    retry_delay: Duration,
}

impl HttpPageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WatchError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts as usize,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::Fetch(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch(format!(
                "unexpected status {} from {}",
                status, url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| WatchError::Fetch(format!("failed to read body from {}: {}", url, e)))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let strategy = FixedInterval::new(self.retry_delay).take(self.retry_attempts);
        Retry::spawn(strategy, || self.fetch_once(url)).await
    }
}
