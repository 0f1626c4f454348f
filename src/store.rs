use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::FilterConfig;
use crate::utils::error::{Result, WatchError};

/// Result of a window mutation, for operator feedback and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChange {
    pub old: Decimal,
    pub new: Decimal,
}

/// Result of a blocklist mutation. Duplicate adds and absent removes are
/// no-ops distinct from success, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlocklistOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotFound,
}

/// In-memory filter configuration, one entry per operator chat.
///
/// `get` hands out a clone, so a scan that took its snapshot keeps it for
/// the whole decision pass no matter what commands arrive meanwhile.
pub struct ConfigStore {
    entries: RwLock<HashMap<i64, FilterConfig>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the chat's config, creating the default entry on first
    /// access.
    pub async fn get(&self, chat_id: i64) -> FilterConfig {
        let mut entries = self.entries.write().await;
        entries.entry(chat_id).or_default().clone()
    }

    pub async fn set_min(&self, chat_id: i64, price: Decimal) -> Result<WindowChange> {
        Self::validate_price(price)?;

        let mut entries = self.entries.write().await;
        let config = entries.entry(chat_id).or_default();
        if price >= config.max_price {
            return Err(WatchError::Validation(format!(
                "minimum {} must stay below the maximum {}",
                price, config.max_price
            )));
        }

        let old = config.min_price;
        config.min_price = price;
        Ok(WindowChange { old, new: price })
    }

    pub async fn set_max(&self, chat_id: i64, price: Decimal) -> Result<WindowChange> {
        Self::validate_price(price)?;

        let mut entries = self.entries.write().await;
        let config = entries.entry(chat_id).or_default();
        if price <= config.min_price {
            return Err(WatchError::Validation(format!(
                "maximum {} must stay above the minimum {}",
                price, config.min_price
            )));
        }

        let old = config.max_price;
        config.max_price = price;
        Ok(WindowChange { old, new: price })
    }

    pub async fn add_scammer(&self, chat_id: i64, name: &str) -> BlocklistOutcome {
        let name = name.trim();
        let mut entries = self.entries.write().await;
        let config = entries.entry(chat_id).or_default();
        if config.scammers.insert(name.to_string()) {
            BlocklistOutcome::Added
        } else {
            BlocklistOutcome::AlreadyPresent
        }
    }

    pub async fn remove_scammer(&self, chat_id: i64, name: &str) -> BlocklistOutcome {
        let name = name.trim();
        let mut entries = self.entries.write().await;
        let config = entries.entry(chat_id).or_default();
        if config.scammers.remove(name) {
            BlocklistOutcome::Removed
        } else {
            BlocklistOutcome::NotFound
        }
    }

    fn validate_price(price: Decimal) -> Result<()> {
        if price.is_sign_negative() {
            return Err(WatchError::Validation(format!(
                "price {} must not be negative",
                price
            )));
        }
        Ok(())
    }
}
