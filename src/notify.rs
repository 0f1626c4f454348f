use std::sync::Arc;

use crate::models::{FilterConfig, Offer, ScanReport};
use crate::telegram::MessageBus;
use crate::utils::error::WatchError;

/// Formats operator-facing messages and pushes them over the bus.
///
/// Transport failures never leave this type: a failed send is logged and
/// dropped, because the notification channel's own problems must not take
/// the scan loop down with them.
#[derive(Clone)]
pub struct Notifier {
    bus: Arc<dyn MessageBus>,
}

impl Notifier {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// Send one message per accepted offer. For report-regardless scans a
    /// summary goes out when nothing matched. Returns how many messages
    /// were actually delivered.
    pub async fn report(
        &self,
        report: &ScanReport,
        config: &FilterConfig,
        always_report: bool,
    ) -> usize {
        let mut delivered = 0;

        for offer in &report.accepted {
            if self.send(&format_offer(offer)).await {
                delivered += 1;
            }
        }

        if report.accepted.is_empty() && always_report {
            if self.send(&format_empty_scan(report, config)).await {
                delivered += 1;
            }
        }

        delivered
    }

    pub async fn scan_failed(&self, error: &WatchError) {
        self.send(&format!("⚠️ Scan failed: {}", error)).await;
    }

    pub async fn started(&self, config: &FilterConfig) {
        self.send(&format!(
            "🟢 Monitoring started\nWindow: {}-{} ₽, blocklist: {} seller(s)",
            config.min_price,
            config.max_price,
            config.scammers.len()
        ))
        .await;
    }

    /// Push a message, swallowing transport failures. Returns whether the
    /// message was delivered.
    pub async fn send(&self, text: &str) -> bool {
        match self.bus.send(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("notification dropped: {}", e);
                false
            }
        }
    }
}

pub fn format_offer(offer: &Offer) -> String {
    let mut message = format!(
        "🔥 Offer found!\nPrice: {} ₽\nSeller: {}",
        offer.price, offer.seller
    );
    if !offer.link.is_empty() {
        message.push('\n');
        message.push_str(&offer.link);
    }
    message
}

pub fn format_empty_scan(report: &ScanReport, config: &FilterConfig) -> String {
    let mut message = format!(
        "No offers in the {}-{} ₽ window ({} checked, {} blocked).",
        config.min_price, config.max_price, report.total_count, report.rejected_count
    );
    if !report.above_window.is_empty() {
        let prices = report
            .above_window
            .iter()
            .map(|offer| offer.price.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        message.push_str(&format!("\nCheapest above the window: {} ₽", prices));
    }
    message
}
