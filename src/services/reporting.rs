use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    bus::EventBus,
    command::intent::{CommandAction, Side},
    events::{CommandEvent, Event},
    ledger::Trade,
};

/// One line of the JSONL activity log: either a processed command or a
/// settled trade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub ts: String,

    /// "command" | "trade"
    pub kind: String,

    pub user_id: String,

    /// Command action ("quote" | "trade" | "error") for command entries
    pub action: Option<String>,

    pub raw_text: Option<String>,
    pub error_kind: Option<String>,

    pub symbol: Option<String>,
    pub side: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub notional: Option<f64>,
    pub fee: Option<f64>,

    pub response: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_trades: u64,
    pub buy_count: u64,
    pub sell_count: u64,
    pub total_value: f64,
    pub total_fees: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total_commands: u64,
    pub quotes: u64,
    pub trades: u64,
    pub rejected: u64,

    /// Rejections by error kind ("insufficient_funds", ...)
    pub rejections_by_kind: HashMap<String, u64>,

    /// Per-user trade statistics
    pub per_user: HashMap<String, UserStats>,
}

/// Subscribes to the event bus and keeps a running activity summary plus an
/// append-only JSONL log on disk.
#[derive(Clone)]
pub struct ActivityReporter {
    summary: Arc<Mutex<ActivitySummary>>,
    log_path: PathBuf,
}

impl ActivityReporter {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            summary: Arc::new(Mutex::new(ActivitySummary::default())),
            log_path,
        }
    }

    pub fn summary(&self) -> ActivitySummary {
        self.summary.lock().unwrap().clone()
    }

    pub async fn start(&self, event_bus: EventBus) {
        let mut rx = event_bus.subscribe();
        let reporter = self.clone();

        tokio::spawn(async move {
            info!(
                "ActivityReporter started (log: {})",
                reporter.log_path.display()
            );

            while let Ok(event) = rx.recv().await {
                match event {
                    Event::Command(cmd) => reporter.on_command(&cmd),
                    Event::Trade(trade) => reporter.on_trade(&trade),
                    Event::MarketRefresh { .. } => continue,
                }

                // Flush to disk best-effort on every relevant event.
                if let Err(e) = reporter.flush_summary() {
                    error!("ActivityReporter failed to flush summary: {}", e);
                }
            }
        });
    }

    pub fn on_command(&self, cmd: &CommandEvent) {
        let mut s = self.summary.lock().unwrap();
        s.total_commands += 1;
        match cmd.action {
            CommandAction::Quote => s.quotes += 1,
            CommandAction::Trade => s.trades += 1,
            CommandAction::Error => {
                s.rejected += 1;
                if let Some(kind) = &cmd.error_kind {
                    *s.rejections_by_kind.entry(kind.clone()).or_insert(0) += 1;
                }
            }
            CommandAction::Info => {}
        }
        drop(s);

        let entry = ActivityLogEntry {
            ts: cmd.timestamp.clone(),
            kind: "command".to_string(),
            user_id: cmd.user_id.clone(),
            action: Some(cmd.action.as_str().to_string()),
            raw_text: Some(cmd.raw_text.clone()),
            error_kind: cmd.error_kind.clone(),
            symbol: None,
            side: None,
            qty: None,
            price: None,
            notional: None,
            fee: None,
            response: Some(cmd.response_text.clone()),
        };
        let _ = self.append_jsonl(&entry);
    }

    pub fn on_trade(&self, trade: &Trade) {
        let mut s = self.summary.lock().unwrap();
        let stats = s.per_user.entry(trade.user_id.clone()).or_default();
        stats.total_trades += 1;
        match trade.side {
            Side::Buy => stats.buy_count += 1,
            Side::Sell => stats.sell_count += 1,
        }
        stats.total_value += trade.total_value;
        stats.total_fees += trade.fee;
        drop(s);

        let entry = ActivityLogEntry {
            ts: Utc::now().to_rfc3339(),
            kind: "trade".to_string(),
            user_id: trade.user_id.clone(),
            action: None,
            raw_text: None,
            error_kind: None,
            symbol: Some(trade.symbol.clone()),
            side: Some(trade.side.as_str().to_string()),
            qty: Some(trade.quantity),
            price: Some(trade.price),
            notional: Some(trade.total_value),
            fee: Some(trade.fee),
            response: None,
        };
        let _ = self.append_jsonl(&entry);
    }

    fn append_jsonl(&self, entry: &ActivityLogEntry) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use std::io::Write;

        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        let line = serde_json::to_string(entry)?;
        writeln!(f, "{}", line)?;
        Ok(())
    }

    fn flush_summary(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let summary_path = self.log_path.with_file_name("activity_summary.json");

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let s = self.summary.lock().unwrap().clone();
        std::fs::write(summary_path, serde_json::to_vec_pretty(&s)?)?;
        Ok(())
    }
}
