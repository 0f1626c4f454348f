// End-to-end scan pipeline: fetch, extract, classify, notify.

use std::time::Duration;

use offerwatch::extract::ExtractStrategy;
use offerwatch::models::UpdateCursor;

use crate::integration::support::*;

#[tokio::test]
async fn test_periodic_scan_notifies_only_accepted_offers() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(LISTING),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;

    let sent = h.bus.sent().await;
    assert_eq!(sent.len(), 1, "only the in-window offer should go out");
    assert!(sent[0].contains("150 ₽"));
    assert!(sent[0].contains("honest_joe"));
    assert!(sent[0].contains("https://funpay.com/lots/offer?id=101"));
}

#[tokio::test]
async fn test_blocklisted_seller_triggers_no_notification() {
    let listing = r#"<html><body>
      <a class="tc-item" href="/lots/offer?id=1">
        <div class="tc-price">150 ₽</div>
        <div class="media-user-name">berek65</div>
      </a>
    </body></html>"#;
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(listing),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;

    assert!(h.bus.sent().await.is_empty());
}

#[tokio::test]
async fn test_quiet_periodic_scan_stays_silent() {
    let listing = r#"<html><body>
      <a class="tc-item" href="/a"><div class="tc-price">999 ₽</div></a>
    </body></html>"#;
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(listing),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;

    assert!(h.bus.sent().await.is_empty());
}

#[tokio::test]
async fn test_manual_check_reports_even_without_matches() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(LISTING),
        RecordingBus::with_updates(vec![vec![update(1, OPERATOR, "/setmin 160")], vec![
            update(2, OPERATOR, "/check"),
        ]]),
    );

    let mut cursor = UpdateCursor::new();
    h.scheduler.poll_tick(&mut cursor).await;
    h.scheduler.poll_tick(&mut cursor).await;

    let sent = h.bus.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("Minimum price set to 160"));
    // 150 now falls below the window, so the summary goes out instead.
    assert!(sent[1].contains("No offers in the 160-200 ₽ window"));
    assert!(sent[1].contains("Cheapest above the window: 250, 300 ₽"));
}

#[tokio::test]
async fn test_free_text_strategy_scans_page_text() {
    let document = "<html><body>account one 150₽ account two 250₽</body></html>";
    let h = harness(
        ExtractStrategy::FreeText,
        StaticFetcher::new(document),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;

    let sent = h.bus.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("150 ₽"));
    assert!(sent[0].contains("unknown"));
    assert!(sent[0].contains(PAGE_URL));
}

#[tokio::test]
async fn test_extraction_failure_warns_operator_and_loop_survives() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new("<html><body><p>site maintenance</p></body></html>"),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;
    h.scheduler.scan_tick(false).await;

    let sent = h.bus.sent().await;
    assert_eq!(sent.len(), 2, "every failed tick warns and the loop keeps going");
    assert!(sent[0].contains("Scan failed"));
    assert_eq!(h.fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_overlapping_scan_ticks_are_skipped_not_queued() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::slow(LISTING, Duration::from_millis(50)),
        RecordingBus::new(),
    );

    tokio::join!(
        h.scheduler.scan_tick(false),
        h.scheduler.scan_tick(false),
        h.scheduler.scan_tick(false)
    );

    assert_eq!(h.fetcher.call_count(), 1, "concurrent ticks must not fetch");
}

#[tokio::test]
async fn test_send_failures_do_not_break_the_scan() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(LISTING),
        RecordingBus::failing_sends(),
    );

    // No panic, no error escaping the tick.
    h.scheduler.scan_tick(false).await;
    h.scheduler.scan_tick(false).await;

    assert_eq!(h.fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_config_mutation_applies_from_next_scan() {
    let h = harness(
        ExtractStrategy::Cards,
        StaticFetcher::new(LISTING),
        RecordingBus::new(),
    );

    h.scheduler.scan_tick(false).await;
    h.store
        .add_scammer(OPERATOR, "honest_joe")
        .await;
    h.scheduler.scan_tick(false).await;

    let sent = h.bus.sent().await;
    // First scan notified, second one rejected the now-blocklisted seller.
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("honest_joe"));
}
