use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use offerwatch::commands::CommandDispatcher;
use offerwatch::config::AppConfig;
use offerwatch::extract::build_extractor;
use offerwatch::fetch::HttpPageFetcher;
use offerwatch::notify::Notifier;
use offerwatch::scheduler::{Monitor, Scheduler};
use offerwatch::store::ConfigStore;
use offerwatch::telegram::{MessageBus, TelegramBus};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("offerwatch=info".parse()?),
        )
        .init();

    info!("Starting offer monitoring...");

    let config = AppConfig::from_env()?;
    let page_url = config.page_url()?;
    info!("Watching {}", page_url);
    info!(
        "Scan every {}s, poll every {}s, strategy {:?}",
        config.scheduler.scan_interval_secs,
        config.scheduler.poll_interval_secs,
        config.monitor.strategy
    );

    let bus: Arc<dyn MessageBus> = Arc::new(TelegramBus::new(
        &config.telegram.bot_token,
        config.telegram.chat_id,
    ));
    let notifier = Notifier::new(Arc::clone(&bus));
    let store = Arc::new(ConfigStore::new());

    let fetcher = Arc::new(HttpPageFetcher::new(&config.fetcher)?);
    let extractor = build_extractor(config.monitor.strategy, &page_url);

    let monitor = Monitor::new(
        fetcher,
        extractor,
        Arc::clone(&store),
        notifier.clone(),
        page_url.as_str(),
        config.telegram.chat_id,
    );
    let dispatcher = CommandDispatcher::new(Arc::clone(&store), config.telegram.chat_id);
    let scheduler = Scheduler::new(monitor, dispatcher, bus, notifier, config.scheduler.clone());

    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
