use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::data::provider::QuoteProvider;

/// Latest known market snapshot for one symbol. Replaced wholesale on
/// refresh, never mutated field-wise; staleness is observable via `as_of`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume: f64,
    pub as_of: DateTime<Utc>,
}

/// In-memory cache of the last-known quote per symbol.
///
/// Reads are synchronous lookups and never touch the network; fetching only
/// happens inside `refresh_all`, which the refresher service drives on a
/// schedule. A failed fetch for one symbol keeps its previous quote
/// (stale-but-available) and does not abort the rest of the refresh.
#[derive(Clone)]
pub struct MarketCache {
    quotes: Arc<DashMap<String, Quote>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self {
            quotes: Arc::new(DashMap::new()),
        }
    }

    /// Pure in-memory lookup. Readers see either the previous or the new
    /// snapshot of an entry, never a torn value.
    pub fn get(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(symbol).map(|q| q.value().clone())
    }

    pub fn insert(&self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Refresh every symbol from the provider, best-effort per symbol.
    /// Returns the number of entries updated.
    pub async fn refresh_all(&self, provider: &dyn QuoteProvider, symbols: &[String]) -> usize {
        let mut updated = 0;

        for symbol in symbols {
            match provider.fetch_quote(symbol).await {
                Ok(quote) => {
                    debug!("[CACHE] Refreshed {}: ${}", symbol, quote.price);
                    self.quotes.insert(symbol.clone(), quote);
                    updated += 1;
                }
                Err(e) => {
                    // Keep the previous quote; retried on the next tick.
                    warn!("[CACHE] Failed to refresh {}: {}", symbol, e);
                }
            }
        }

        updated
    }
}

impl Default for MarketCache {
    fn default() -> Self {
        Self::new()
    }
}
