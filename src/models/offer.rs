use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Seller name used when a listing does not expose one.
pub const UNKNOWN_SELLER: &str = "unknown";

/// A single candidate listing pulled from the monitored page.
///
/// Offers are rebuilt from scratch on every scan and discarded once the
/// scan's decision pass is over; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub price: Decimal,
    pub seller: String,
    pub link: String,
}

impl Offer {
    pub fn new(price: Decimal, seller: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            price,
            seller: seller.into(),
            link: link.into(),
        }
    }
}
