use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};

use crate::commands::{CommandDispatcher, Dispatch};
use crate::config::SchedulerConfig;
use crate::extract::OfferExtractor;
use crate::fetch::PageFetcher;
use crate::filter;
use crate::models::{FilterConfig, ScanReport, UpdateCursor};
use crate::notify::Notifier;
use crate::store::ConfigStore;
use crate::telegram::MessageBus;
use crate::utils::error::Result;

/// In-flight flag for the scan task.
///
/// A tick that fires while a scan is still running must be skipped, not
/// queued: a slow fetch would otherwise pile up overlapping scans without
/// bound. The flag is its own type so that skip behavior can be tested
/// directly.
pub struct ScanGate {
    active: AtomicBool,
}

impl Default for ScanGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanGate {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Claim the gate. Returns None when a scan already holds it; the guard
    /// releases on drop.
    pub fn try_begin(&self) -> Option<ScanGuard<'_>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(ScanGuard { gate: self })
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

pub struct ScanGuard<'a> {
    gate: &'a ScanGate,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.gate.active.store(false, Ordering::Release);
    }
}

/// One scan, end to end: config snapshot, fetch, extract, classify, notify.
pub struct Monitor {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Box<dyn OfferExtractor>,
    store: Arc<ConfigStore>,
    notifier: Notifier,
    page_url: String,
    chat_id: i64,
}

impl Monitor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Box<dyn OfferExtractor>,
        store: Arc<ConfigStore>,
        notifier: Notifier,
        page_url: impl Into<String>,
        chat_id: i64,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            notifier,
            page_url: page_url.into(),
            chat_id,
        }
    }

    pub async fn current_config(&self) -> FilterConfig {
        self.store.get(self.chat_id).await
    }

    /// Run one scan. The config snapshot is taken up front, so commands
    /// arriving mid-scan apply from the next scan on.
    pub async fn scan(&self, always_report: bool) -> Result<ScanReport> {
        tracing::info!("checking offers at {}", self.page_url);

        let config = self.store.get(self.chat_id).await;
        let document = self.fetcher.fetch(&self.page_url).await?;
        let offers = self.extractor.extract(&document)?;

        let report = filter::classify(offers, &config);
        tracing::info!(
            "scan done: {} accepted, {} above window, {} blocked, {} total",
            report.accepted.len(),
            report.above_window.len(),
            report.rejected_count,
            report.total_count
        );

        self.notifier.report(&report, &config, always_report).await;
        Ok(report)
    }
}

/// Drives the two repeating tasks: the periodic scan and the command poll.
/// The tasks run on independent timers and never wait for each other.
pub struct Scheduler {
    monitor: Monitor,
    dispatcher: CommandDispatcher,
    bus: Arc<dyn MessageBus>,
    notifier: Notifier,
    config: SchedulerConfig,
    gate: ScanGate,
}

impl Scheduler {
    pub fn new(
        monitor: Monitor,
        dispatcher: CommandDispatcher,
        bus: Arc<dyn MessageBus>,
        notifier: Notifier,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            monitor,
            dispatcher,
            bus,
            notifier,
            config,
            gate: ScanGate::new(),
        }
    }

    /// Run both loops until the process is stopped from outside.
    pub async fn run(&self) {
        self.notifier
            .started(&self.monitor.current_config().await)
            .await;

        // First check right away, then on the interval.
        self.scan_tick(false).await;

        tokio::join!(self.scan_loop(), self.poll_loop());
    }

    async fn scan_loop(&self) {
        let mut ticker = interval(self.config.scan_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval yields its first tick immediately; the startup scan
        // already covered it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.scan_tick(false).await;
        }
    }

    async fn poll_loop(&self) {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cursor = UpdateCursor::new();

        loop {
            ticker.tick().await;
            self.poll_tick(&mut cursor).await;
        }
    }

    /// One scan tick. Skipped outright when the previous scan is still in
    /// flight. Scan failures are logged, surfaced to the operator as a
    /// one-line warning, and never stop the loop.
    pub async fn scan_tick(&self, always_report: bool) {
        let Some(_guard) = self.gate.try_begin() else {
            tracing::warn!("previous scan still in flight, skipping this tick");
            if always_report {
                self.notifier
                    .send("A scan is already running, try again shortly.")
                    .await;
            }
            return;
        };

        if let Err(e) = self.monitor.scan(always_report).await {
            tracing::error!("scan failed: {}", e);
            self.notifier.scan_failed(&e).await;
        }
    }

    /// One poll tick: fetch updates past the cursor, advance it past every
    /// retrieved item, then dispatch in arrival order. Poll failures are
    /// logged and retried on the next tick.
    pub async fn poll_tick(&self, cursor: &mut UpdateCursor) {
        let updates = match self
            .bus
            .poll_updates(cursor.last_seen_id(), self.config.poll_timeout())
            .await
        {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("poll failed, retrying next tick: {}", e);
                return;
            }
        };

        for update in updates {
            cursor.advance_past(update.id);
            match self.dispatcher.dispatch(&update).await {
                Dispatch::Ignored => {}
                Dispatch::Reply(text) => {
                    self.notifier.send(&text).await;
                }
                Dispatch::TriggerScan => self.scan_tick(true).await,
            }
        }
    }
}
