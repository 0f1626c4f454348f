use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::Offer;
use crate::utils::error::Result;

pub mod cards;
pub mod free_text;

pub use cards::CardExtractor;
pub use free_text::FreeTextExtractor;

/// Strategy for turning a fetched document into offer candidates.
///
/// Implementations tolerate malformed listings without raising: a listing
/// with no parseable price is skipped, a missing seller becomes the
/// "unknown" sentinel, a missing link becomes an empty string. An error is
/// reserved for documents that are unusable wholesale.
pub trait OfferExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, document: &str) -> Result<Vec<Offer>>;
}

/// Which extractor a deployment runs with, selected in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    FreeText,
    Cards,
}

pub fn build_extractor(strategy: ExtractStrategy, page_url: &Url) -> Box<dyn OfferExtractor> {
    match strategy {
        ExtractStrategy::FreeText => Box::new(FreeTextExtractor::new(page_url.as_str())),
        ExtractStrategy::Cards => Box::new(CardExtractor::new(page_url.clone())),
    }
}
