use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;

use crate::config::PairConfig;
use crate::constants::market::SIM_WALK_PCT;
use crate::data::cache::Quote;
use crate::error::ProviderError;

/// Market data collaborator. Implementations may hit the network; the cache
/// only calls this from its refresh path, never from `get`.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;
}

/// Simulated market data source: a random walk around a configured anchor
/// price per symbol, with randomized 24h change and volume. No exchange is
/// ever contacted.
pub struct SimulatedProvider {
    base_prices: HashMap<String, f64>,
}

impl SimulatedProvider {
    pub fn new(pairs: &[PairConfig]) -> Self {
        let base_prices = pairs
            .iter()
            .map(|p| (p.symbol(), p.base_price))
            .collect();
        Self { base_prices }
    }
}

#[async_trait]
impl QuoteProvider for SimulatedProvider {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let base_price =
            *self
                .base_prices
                .get(symbol)
                .ok_or_else(|| ProviderError::UnknownSymbol {
                    symbol: symbol.to_string(),
                })?;

        let mut rng = rand::thread_rng();
        let price = base_price * (1.0 + rng.gen_range(-SIM_WALK_PCT..SIM_WALK_PCT));
        let change_24h = rng.gen_range(-5.0..5.0);
        let volume = rng.gen_range(1_000_000.0..10_000_000.0);

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            change_24h,
            volume,
            as_of: Utc::now(),
        })
    }
}
