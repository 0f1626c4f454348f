use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Window bounds applied until the operator says otherwise.
pub const DEFAULT_MIN_PRICE: u64 = 100;
pub const DEFAULT_MAX_PRICE: u64 = 200;

/// Blocklist entries every fresh config starts with.
pub const DEFAULT_SCAMMERS: &[&str] = &["berek65"];

/// The active filter for one operator: an open price window and a seller
/// blocklist. Sellers are matched case-sensitively, exactly as listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterConfig {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub scammers: BTreeSet<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_price: Decimal::from(DEFAULT_MIN_PRICE),
            max_price: Decimal::from(DEFAULT_MAX_PRICE),
            scammers: DEFAULT_SCAMMERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FilterConfig {
    /// True when the price falls strictly inside the window. Offers sitting
    /// exactly on either bound are not matches.
    pub fn window_contains(&self, price: Decimal) -> bool {
        price > self.min_price && price < self.max_price
    }

    pub fn is_blocklisted(&self, seller: &str) -> bool {
        self.scammers.contains(seller)
    }
}
