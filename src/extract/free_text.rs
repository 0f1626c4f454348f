use regex::Regex;
use rust_decimal::Decimal;
use scraper::Html;
use std::str::FromStr;

use super::OfferExtractor;
use crate::models::{Offer, UNKNOWN_SELLER};
use crate::utils::error::Result;

/// Scans the page's visible text for ruble-suffixed integers and turns every
/// match into a candidate offer.
///
/// This strategy has no structural knowledge of the page: the seller is
/// always the "unknown" sentinel, the link is always the page URL, and a
/// price string that appears twice produces two candidates. What it trades
/// in fidelity it gains in resilience to markup changes.
pub struct FreeTextExtractor {
    price_re: Regex,
    page_url: String,
}

impl FreeTextExtractor {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            price_re: Regex::new(r"(\d+)\s*₽").unwrap(),
            page_url: page_url.into(),
        }
    }
}

impl OfferExtractor for FreeTextExtractor {
    fn name(&self) -> &str {
        "free_text"
    }

    fn extract(&self, document: &str) -> Result<Vec<Offer>> {
        let html = Html::parse_document(document);
        let text = html.root_element().text().collect::<Vec<_>>().join(" ");

        let mut offers = Vec::new();
        for token in text.split_whitespace() {
            if let Some(captures) = self.price_re.captures(token) {
                if let Ok(price) = Decimal::from_str(&captures[1]) {
                    offers.push(Offer::new(price, UNKNOWN_SELLER, self.page_url.clone()));
                }
            }
        }

        tracing::debug!("free-text scan found {} price tokens", offers.len());
        Ok(offers)
    }
}
