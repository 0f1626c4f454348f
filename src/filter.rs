use crate::models::{FilterConfig, Offer, ScanReport};

/// How many above-window offers a report carries. Enough to show the
/// operator how far the market sits from their window without flooding them.
pub const ABOVE_WINDOW_LIMIT: usize = 3;

/// Classify extracted offers against a config snapshot.
///
/// Blocklisted sellers are dropped first, whatever their price. Clean offers
/// strictly inside the window are accepted; of the rest, the cheapest ones
/// above the window are kept (ascending, at most [`ABOVE_WINDOW_LIMIT`]) as
/// a market summary. Offers sitting exactly on a bound land in no bucket.
pub fn classify(offers: Vec<Offer>, config: &FilterConfig) -> ScanReport {
    let total_count = offers.len();
    let mut accepted = Vec::new();
    let mut above_window = Vec::new();
    let mut rejected_count = 0usize;

    for offer in offers {
        if config.is_blocklisted(&offer.seller) {
            rejected_count += 1;
            continue;
        }
        if config.window_contains(offer.price) {
            accepted.push(offer);
        } else if offer.price > config.max_price {
            above_window.push(offer);
        }
    }

    above_window.sort_by(|a, b| a.price.cmp(&b.price));
    above_window.truncate(ABOVE_WINDOW_LIMIT);

    ScanReport {
        accepted,
        above_window,
        rejected_count,
        total_count,
    }
}
