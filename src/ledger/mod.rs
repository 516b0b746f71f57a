//! Per-user balances and append-only trade history.
//!
//! The ledger is the single owner of account state. All mutation goes
//! through `reserve_and_settle`, which runs under that user's mutex so a
//! balance check can never act on a since-stale balance. Different users
//! never contend on a shared lock.

pub mod store;


use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::command::intent::{OrderKind, Side};
use crate::constants::ledger::BALANCE_EPSILON;
use crate::error::CommandError;
use crate::ledger::store::LedgerStore;
use crate::symbols::Pair;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Settled against the simulated ledger; no exchange was contacted.
    Simulated,
    Filled,
    Rejected,
}

/// One settled order. Append-only: created already-terminal in simulated
/// mode and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
    pub fee: f64,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Account {
    balances: HashMap<String, f64>,
    trades: Vec<Trade>,
}

#[derive(Clone)]
pub struct Ledger {
    accounts: Arc<DashMap<String, Arc<Mutex<Account>>>>,
    store: Arc<dyn LedgerStore>,
    starting_balances: HashMap<String, f64>,
    /// Fee as a percentage of notional value.
    fee_pct: f64,
}

impl Ledger {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        starting_balances: HashMap<String, f64>,
        fee_pct: f64,
    ) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            store,
            starting_balances,
            fee_pct,
        }
    }

    /// Fetch or lazily create the account for a user. New accounts load
    /// balances from the store, falling back to the configured starting
    /// balances.
    async fn account(&self, user_id: &str) -> Arc<Mutex<Account>> {
        if let Some(acct) = self.accounts.get(user_id) {
            return acct.value().clone();
        }

        let balances = match self.store.load_balances(user_id).await {
            Ok(Some(loaded)) => loaded,
            Ok(None) => self.starting_balances.clone(),
            Err(e) => {
                warn!(
                    "[LEDGER] Failed to load balances for {}: {} (seeding defaults)",
                    user_id, e
                );
                self.starting_balances.clone()
            }
        };

        self.accounts
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Account {
                    balances,
                    trades: Vec::new(),
                }))
            })
            .value()
            .clone()
    }

    pub async fn balance(&self, user_id: &str, asset: &str) -> f64 {
        let account = self.account(user_id).await;
        let acct = account.lock().await;
        *acct.balances.get(asset).unwrap_or(&0.0)
    }

    /// Snapshot of every asset balance for a user.
    pub async fn balances(&self, user_id: &str) -> HashMap<String, f64> {
        let account = self.account(user_id).await;
        let acct = account.lock().await;
        acct.balances.clone()
    }

    /// Check funds, move both legs, and append exactly one trade — or fail
    /// with no partial mutation. The user's mutex is held for the whole
    /// check-debit-credit-append sequence and released on every exit path.
    pub async fn reserve_and_settle(
        &self,
        user_id: &str,
        pair: &Pair,
        side: Side,
        kind: OrderKind,
        quantity: f64,
        price: f64,
    ) -> Result<Trade, CommandError> {
        let account = self.account(user_id).await;
        let mut acct = account.lock().await;

        let notional = quantity * price;
        let fee = notional * self.fee_pct / 100.0;

        let snapshot = acct.balances.clone();

        match side {
            Side::Buy => {
                let required = notional + fee;
                let available = *acct.balances.get(&pair.quote).unwrap_or(&0.0);
                if available + BALANCE_EPSILON < required {
                    return Err(CommandError::InsufficientFunds {
                        asset: pair.quote.clone(),
                        required,
                        available,
                    });
                }
                *acct.balances.entry(pair.quote.clone()).or_insert(0.0) -= required;
                *acct.balances.entry(pair.base.clone()).or_insert(0.0) += quantity;
            }
            Side::Sell => {
                let available = *acct.balances.get(&pair.base).unwrap_or(&0.0);
                if available + BALANCE_EPSILON < quantity {
                    return Err(CommandError::InsufficientInventory {
                        asset: pair.base.clone(),
                        required: quantity,
                        available,
                    });
                }
                *acct.balances.entry(pair.base.clone()).or_insert(0.0) -= quantity;
                *acct.balances.entry(pair.quote.clone()).or_insert(0.0) += notional - fee;
            }
        }

        // Absorb float dust so a fully-spent balance reads exactly zero.
        for balance in acct.balances.values_mut() {
            if balance.abs() < BALANCE_EPSILON {
                *balance = 0.0;
            }
        }

        // Invariant: no balance may go negative. A breach here means the
        // sufficiency check above is wrong — roll back and surface loudly.
        if let Some((asset, bad)) = acct
            .balances
            .iter()
            .find(|(_, b)| **b < -BALANCE_EPSILON)
            .map(|(a, b)| (a.clone(), *b))
        {
            acct.balances = snapshot;
            error!(
                "[LEDGER] Invariant breach for {}: {} balance would be {}",
                user_id, asset, bad
            );
            return Err(CommandError::LedgerInconsistency {
                detail: format!("{} balance would go negative ({})", asset, bad),
            });
        }

        let trade = Trade {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            symbol: pair.symbol.clone(),
            side,
            kind,
            quantity,
            price,
            total_value: notional,
            fee,
            status: TradeStatus::Simulated,
            created_at: Utc::now(),
        };

        acct.trades.push(trade.clone());

        // Persistence is best-effort: the in-memory ledger is authoritative
        // for this simulated account, the store is the durable log.
        if let Err(e) = self.store.persist_trade(&trade).await {
            warn!("[LEDGER] Failed to persist trade {}: {}", trade.id, e);
        }

        info!(
            "[LEDGER] {} {} {} {} @ {} (fee {})",
            user_id,
            side.as_str(),
            quantity,
            pair.symbol,
            price,
            fee
        );

        Ok(trade)
    }

    /// Trade history, most-recent-first. Paging is by index, not cursor:
    /// concurrent inserts during paging may shift results.
    pub async fn history(&self, user_id: &str, limit: usize, offset: usize) -> Vec<Trade> {
        let account = self.account(user_id).await;
        let acct = account.lock().await;
        acct.trades
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}
