use serde::{Deserialize, Serialize};

use crate::models::Offer;

/// Outcome of a single scan's decision pass. Built once, handed straight to
/// the notifier, then dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanReport {
    /// Offers strictly inside the price window, in extraction order.
    pub accepted: Vec<Offer>,
    /// The cheapest offers above the window, ascending, at most three.
    pub above_window: Vec<Offer>,
    /// Offers dropped because their seller is blocklisted.
    pub rejected_count: usize,
    /// Everything the extractor produced, before filtering.
    pub total_count: usize,
}

impl ScanReport {
    pub fn has_matches(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Watermark into the inbound update stream. Only ever moves forward;
/// every retrieved update advances it, relevant or not, so nothing is
/// processed twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCursor {
    last_seen_id: i64,
}

impl UpdateCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen_id(&self) -> i64 {
        self.last_seen_id
    }

    /// Move the watermark past `id`. Ids at or below the watermark are
    /// ignored, so replayed updates cannot rewind it.
    pub fn advance_past(&mut self, id: i64) {
        if id > self.last_seen_id {
            self.last_seen_id = id;
        }
    }
}
