// Shared fixtures and in-process doubles for the integration suite.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use offerwatch::commands::CommandDispatcher;
use offerwatch::config::SchedulerConfig;
use offerwatch::extract::{build_extractor, ExtractStrategy};
use offerwatch::fetch::PageFetcher;
use offerwatch::notify::Notifier;
use offerwatch::scheduler::{Monitor, Scheduler};
use offerwatch::store::ConfigStore;
use offerwatch::telegram::{InboundMessage, MessageBus};
use offerwatch::{Result, WatchError};

pub const PAGE_URL: &str = "https://funpay.com/lots/210/";
pub const OPERATOR: i64 = 777;
pub const STRANGER: i64 = 1234;

/// A FunPay-style listing: one offer inside the default window, two above
/// it, and one from the seed-blocklisted seller.
pub const LISTING: &str = r#"<html><body>
  <div class="content">
    <a class="tc-item" href="/lots/offer?id=101">
      <div class="tc-price">150 ₽</div>
      <div class="media-user-name">honest_joe</div>
    </a>
    <a class="tc-item" href="/lots/offer?id=102">
      <div class="tc-price">250 ₽</div>
      <div class="media-user-name">resell_pro</div>
    </a>
    <a class="tc-item" href="/lots/offer?id=103">
      <div class="tc-price">300 ₽</div>
      <div class="media-user-name">bulk_trader</div>
    </a>
    <a class="tc-item" href="/lots/offer?id=104">
      <div class="tc-price">120 ₽</div>
      <div class="media-user-name">berek65</div>
    </a>
  </div>
</body></html>"#;

pub struct StaticFetcher {
    document: String,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(document: &str) -> Self {
        Self {
            document: document.to_string(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(document: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(document)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.document.clone())
    }
}

/// Records every outbound message and serves scripted update batches, one
/// batch per poll.
pub struct RecordingBus {
    batches: Mutex<VecDeque<Vec<InboundMessage>>>,
    sent: Mutex<Vec<String>>,
    fail_sends: bool,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::with_updates(vec![])
    }

    pub fn with_updates(batches: Vec<Vec<InboundMessage>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }

    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::new()
        }
    }

    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageBus for RecordingBus {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail_sends {
            return Err(WatchError::Send("connection reset".to_string()));
        }
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }

    async fn poll_updates(
        &self,
        _since_id: i64,
        _timeout: Duration,
    ) -> Result<Vec<InboundMessage>> {
        Ok(self.batches.lock().await.pop_front().unwrap_or_default())
    }
}

pub fn update(id: i64, sender_id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        id,
        sender_id,
        text: text.to_string(),
    }
}

pub struct Harness {
    pub scheduler: Scheduler,
    pub store: Arc<ConfigStore>,
    pub bus: Arc<RecordingBus>,
    pub fetcher: Arc<StaticFetcher>,
}

pub fn harness(
    strategy: ExtractStrategy,
    fetcher: StaticFetcher,
    bus: RecordingBus,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let bus = Arc::new(bus);
    let store = Arc::new(ConfigStore::new());

    let page_url = Url::parse(PAGE_URL).unwrap();
    let notifier = Notifier::new(bus.clone() as Arc<dyn MessageBus>);
    let monitor = Monitor::new(
        fetcher.clone() as Arc<dyn PageFetcher>,
        build_extractor(strategy, &page_url),
        Arc::clone(&store),
        notifier.clone(),
        PAGE_URL,
        OPERATOR,
    );
    let dispatcher = CommandDispatcher::new(Arc::clone(&store), OPERATOR);
    let scheduler = Scheduler::new(
        monitor,
        dispatcher,
        bus.clone() as Arc<dyn MessageBus>,
        notifier,
        SchedulerConfig {
            scan_interval_secs: 300,
            poll_interval_secs: 3,
            poll_timeout_secs: 1,
        },
    );

    Harness {
        scheduler,
        store,
        bus,
        fetcher,
    }
}
