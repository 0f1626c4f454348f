use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use url::Url;

use super::OfferExtractor;
use crate::models::{Offer, UNKNOWN_SELLER};
use crate::utils::error::{Result, WatchError};

// FunPay listing markup: every lot is an <a class="tc-item"> row with
// price and seller columns inside it.
pub const DEFAULT_CARD_SELECTOR: &str = "a.tc-item";
pub const DEFAULT_PRICE_SELECTOR: &str = ".tc-price";
pub const DEFAULT_SELLER_SELECTOR: &str = ".media-user-name";

/// Walks repeated item-card elements and reads price, seller and link out
/// of each one.
///
/// Individual cards fail soft: no parseable price skips the card, no seller
/// substitutes the "unknown" sentinel, no link yields an empty string. A
/// document containing no card elements at all is an extraction error, since
/// that means the page no longer looks like a listing.
pub struct CardExtractor {
    base_url: Url,
    card_selector: String,
    cards: Selector,
    price: Selector,
    seller: Selector,
    links: Selector,
    price_re: Regex,
}

impl CardExtractor {
    pub fn new(base_url: Url) -> Self {
        Self::with_selectors(
            base_url,
            DEFAULT_CARD_SELECTOR,
            DEFAULT_PRICE_SELECTOR,
            DEFAULT_SELLER_SELECTOR,
        )
        .expect("default selectors are valid")
    }

    pub fn with_selectors(
        base_url: Url,
        card: &str,
        price: &str,
        seller: &str,
    ) -> Result<Self> {
        let parse = |s: &str| {
            Selector::parse(s)
                .map_err(|e| WatchError::Extraction(format!("invalid selector '{}': {:?}", s, e)))
        };

        Ok(Self {
            base_url,
            card_selector: card.to_string(),
            cards: parse(card)?,
            price: parse(price)?,
            seller: parse(seller)?,
            links: parse("a[href]")?,
            price_re: Regex::new(r"(\d+(?:[.,]\d+)?)").unwrap(),
        })
    }

    fn read_price(&self, card: &ElementRef) -> Option<Decimal> {
        let text = card
            .select(&self.price)
            .next()?
            .text()
            .collect::<Vec<_>>()
            .join(" ");
        let captures = self.price_re.captures(text.trim())?;
        Decimal::from_str(&captures[1].replace(',', ".")).ok()
    }

    fn read_seller(&self, card: &ElementRef) -> String {
        card.select(&self.seller)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_SELLER.to_string())
    }

    fn read_link(&self, card: &ElementRef) -> String {
        let href = card
            .value()
            .attr("href")
            .or_else(|| {
                card.select(&self.links)
                    .next()
                    .and_then(|el| el.value().attr("href"))
            });

        match href {
            Some(href) => self
                .base_url
                .join(href)
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => String::new(),
        }
    }
}

impl OfferExtractor for CardExtractor {
    fn name(&self) -> &str {
        "cards"
    }

    fn extract(&self, document: &str) -> Result<Vec<Offer>> {
        let html = Html::parse_document(document);
        let cards: Vec<ElementRef> = html.select(&self.cards).collect();

        if cards.is_empty() {
            return Err(WatchError::Extraction(format!(
                "no '{}' elements found in document",
                self.card_selector
            )));
        }

        let mut offers = Vec::new();
        let mut skipped = 0usize;
        for card in &cards {
            match self.read_price(card) {
                Some(price) => {
                    offers.push(Offer::new(price, self.read_seller(card), self.read_link(card)));
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!("skipped {} cards without a parseable price", skipped);
        }
        tracing::debug!("card scan produced {} offers from {} cards", offers.len(), cards.len());

        Ok(offers)
    }
}
