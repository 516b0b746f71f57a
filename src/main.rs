use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use rust_tradebot::api::{run_server, AppState};
use rust_tradebot::bus::EventBus;
use rust_tradebot::config::AppConfig;
use rust_tradebot::data::cache::MarketCache;
use rust_tradebot::data::provider::SimulatedProvider;
use rust_tradebot::engine::ExecutionEngine;
use rust_tradebot::ledger::store::JsonlStore;
use rust_tradebot::ledger::Ledger;
use rust_tradebot::services::refresher::MarketRefresher;
use rust_tradebot::services::reporting::ActivityReporter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting TradeBot...");

    // Load Configuration
    let mut config = AppConfig::load();
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(port) = port.parse() {
            config.server_port = port;
        }
    }
    info!(
        "Loaded configuration: {} pairs, fee {}%, refresh every {}s",
        config.pairs.len(),
        config.fee_pct,
        config.refresh_interval_secs
    );

    // Event bus shared by the engine and its observers
    let event_bus = EventBus::new(1000);

    // Market data: simulated provider feeding the in-memory cache
    let cache = MarketCache::new();
    let provider = Arc::new(SimulatedProvider::new(&config.pairs));

    // Ledger over the JSONL trade store
    let store = Arc::new(JsonlStore::new(PathBuf::from(&config.trade_log_path)));
    let ledger = Ledger::new(store, config.starting_balances.clone(), config.fee_pct);

    let engine = Arc::new(ExecutionEngine::new(
        &config,
        cache.clone(),
        ledger,
        event_bus.clone(),
    ));

    // Activity reporter (JSONL log + summary next to the trade log)
    let reporter = ActivityReporter::new(
        PathBuf::from(&config.trade_log_path).with_file_name("activity.jsonl"),
    );
    reporter.start(event_bus.clone()).await;

    // Scheduled market refresh
    let symbols: Vec<String> = config.pairs.iter().map(|p| p.symbol()).collect();
    let refresher = MarketRefresher::new(
        cache,
        provider,
        symbols,
        config.refresh_interval_secs,
    );
    if let Err(e) = refresher.start(event_bus.clone()).await {
        tracing::warn!("Failed to start market refresher: {}", e);
    }

    // Start API Server
    info!("Initializing API Server...");
    let app_state = Arc::new(AppState {
        engine,
        reporter,
        config,
    });
    run_server(app_state).await;

    Ok(())
}
