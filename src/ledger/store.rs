//! Durable-storage collaborator behind the ledger.
//!
//! The relational schema of a real deployment lives outside this crate; the
//! ledger only needs two operations from it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::ledger::Trade;

pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn persist_trade(&self, trade: &Trade) -> StoreResult<()>;

    /// Balances previously saved for this user, or None for a fresh account.
    async fn load_balances(&self, user_id: &str) -> StoreResult<Option<HashMap<String, f64>>>;
}

/// Store that keeps everything in memory. Used in tests and as the default
/// when no durable backend is wired up.
#[derive(Default)]
pub struct InMemoryStore {
    trades: Mutex<Vec<Trade>>,
    balances: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(user_id: &str, balances: HashMap<String, f64>) -> Self {
        let store = Self::default();
        store
            .balances
            .lock()
            .unwrap()
            .insert(user_id.to_string(), balances);
        store
    }

    pub fn trade_count(&self) -> usize {
        self.trades.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn persist_trade(&self, trade: &Trade) -> StoreResult<()> {
        self.trades.lock().unwrap().push(trade.clone());
        Ok(())
    }

    async fn load_balances(&self, user_id: &str) -> StoreResult<Option<HashMap<String, f64>>> {
        Ok(self.balances.lock().unwrap().get(user_id).cloned())
    }
}

/// Append-only JSONL trade log on disk, one trade per line.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LedgerStore for JsonlStore {
    async fn persist_trade(&self, trade: &Trade) -> StoreResult<()> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = serde_json::to_string(trade)?;
        writeln!(f, "{}", line)?;
        Ok(())
    }

    async fn load_balances(&self, _user_id: &str) -> StoreResult<Option<HashMap<String, f64>>> {
        // The JSONL log records trades, not balances; fresh accounts start
        // from the configured seed.
        Ok(None)
    }
}
