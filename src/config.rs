use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

use crate::extract::ExtractStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub telegram: TelegramConfig,
    pub fetcher: FetcherConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// The listing page to watch.
    pub page_url: String,
    pub strategy: ExtractStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// The operator chat. Commands from any other sender are discarded.
    pub chat_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub request_timeout: u64,
    pub user_agent: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub scan_interval_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
}

impl SchedulerConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "OFFERWATCH_"
            .add_source(Environment::with_prefix("OFFERWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // The flat variables of the original deployment keep working.
        if let Ok(url) = env::var("FUNPAY_URL") {
            config.monitor.page_url = url;
        }
        if let Ok(token) = env::var("BOT_TOKEN") {
            config.telegram.bot_token = token;
        }
        if let Ok(chat) = env::var("CHAT_ID") {
            config.telegram.chat_id = chat
                .parse()
                .map_err(|_| ConfigError::Message("CHAT_ID must be an integer".into()))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate monitor configuration
        if self.monitor.page_url.is_empty() {
            return Err(ConfigError::Message(
                "monitor.page_url must be set (or FUNPAY_URL)".into(),
            ));
        }
        if Url::parse(&self.monitor.page_url).is_err() {
            return Err(ConfigError::Message("Invalid monitor.page_url format".into()));
        }

        // Validate telegram configuration
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Message(
                "telegram.bot_token must be set (or BOT_TOKEN)".into(),
            ));
        }
        if self.telegram.chat_id == 0 {
            return Err(ConfigError::Message(
                "telegram.chat_id must be set (or CHAT_ID)".into(),
            ));
        }

        // Validate fetcher configuration
        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "fetcher.request_timeout must be greater than 0".into(),
            ));
        }
        if self.fetcher.user_agent.is_empty() {
            return Err(ConfigError::Message("fetcher.user_agent must be set".into()));
        }

        // Validate scheduler configuration
        if self.scheduler.scan_interval_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.scan_interval_secs must be greater than 0".into(),
            ));
        }
        if self.scheduler.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.poll_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn page_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.monitor.page_url)
            .map_err(|_| ConfigError::Message("Invalid monitor.page_url format".into()))
    }
}
