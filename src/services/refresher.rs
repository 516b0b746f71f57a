//! Scheduled market data refresh.
//!
//! Runs independently of command handling and holds no user-scoped lock: a
//! command that reads mid-refresh sees either the previous or the new quote
//! snapshot.

use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::bus::EventBus;
use crate::data::cache::MarketCache;
use crate::data::provider::QuoteProvider;
use crate::events::Event;

pub struct MarketRefresher {
    cache: MarketCache,
    provider: Arc<dyn QuoteProvider>,
    symbols: Vec<String>,
    interval_secs: u64,
}

impl MarketRefresher {
    pub fn new(
        cache: MarketCache,
        provider: Arc<dyn QuoteProvider>,
        symbols: Vec<String>,
        interval_secs: u64,
    ) -> Self {
        Self {
            cache,
            provider,
            symbols,
            interval_secs,
        }
    }

    /// Prime the cache once, then keep refreshing on the configured
    /// schedule. Failures are per-symbol and retried next tick.
    pub async fn start(&self, event_bus: EventBus) -> Result<(), Box<dyn std::error::Error>> {
        let primed = self
            .cache
            .refresh_all(self.provider.as_ref(), &self.symbols)
            .await;
        info!(
            "[REFRESH] Primed cache with {}/{} symbols from {}",
            primed,
            self.symbols.len(),
            self.provider.name()
        );

        let scheduler = JobScheduler::new().await?;

        let cache = self.cache.clone();
        let provider = self.provider.clone();
        let symbols = self.symbols.clone();

        let job = Job::new_async(cron_expr(self.interval_secs).as_str(), move |_uuid, _l| {
            let cache = cache.clone();
            let provider = provider.clone();
            let symbols = symbols.clone();
            let bus = event_bus.clone();

            Box::pin(async move {
                let updated = cache.refresh_all(provider.as_ref(), &symbols).await;
                bus.publish(Event::MarketRefresh {
                    updated,
                    total: symbols.len(),
                })
                .ok();
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(
            "[REFRESH] Market refresh scheduled every {}s for {} symbols",
            self.interval_secs,
            self.symbols.len()
        );

        Ok(())
    }
}

/// Six-field cron expression for "every N seconds" (or minutes when N is a
/// whole number of them).
fn cron_expr(interval_secs: u64) -> String {
    if interval_secs >= 60 && interval_secs % 60 == 0 {
        format!("0 */{} * * * *", interval_secs / 60)
    } else {
        format!("*/{} * * * * *", interval_secs.clamp(1, 59))
    }
}
