use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::constants::{market, trading};

#[derive(Clone, Debug, Deserialize)]
pub struct PairConfig {
    pub base: String,
    pub quote: String,
    /// Spoken names that resolve to this pair ("bitcoin", "btc", ...).
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Anchor price used by the simulated quote provider.
    pub base_price: f64,
}

impl PairConfig {
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Quote asset every order settles against (and the default pairing for
    /// assets named without one).
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    /// Fee charged per trade, as a percentage of notional value.
    #[serde(default = "default_fee_pct")]
    pub fee_pct: f64,

    /// Seconds between market data refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Default page size for trade history queries.
    #[serde(default = "default_history_page_limit")]
    pub history_page_limit: usize,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Where the reporter writes its JSONL command/trade log.
    #[serde(default = "default_trade_log_path")]
    pub trade_log_path: String,

    /// Optional leading phrases stripped before parsing ("hey tradebot ...").
    #[serde(default = "default_wake_phrases")]
    pub wake_phrases: Vec<String>,

    /// Balances seeded into a fresh account on first use.
    #[serde(default = "default_starting_balances")]
    pub starting_balances: HashMap<String, f64>,

    #[serde(default = "default_pairs")]
    pub pairs: Vec<PairConfig>,
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_fee_pct() -> f64 {
    trading::DEFAULT_FEE_PCT
}

fn default_refresh_interval_secs() -> u64 {
    market::DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_history_page_limit() -> usize {
    10
}

fn default_server_port() -> u16 {
    3000
}

fn default_trade_log_path() -> String {
    "./data/trades.jsonl".to_string()
}

fn default_wake_phrases() -> Vec<String> {
    vec![
        "hey tradebot".to_string(),
        "okay tradebot".to_string(),
        "tradebot".to_string(),
    ]
}

fn default_starting_balances() -> HashMap<String, f64> {
    HashMap::from([("USDT".to_string(), 10_000.0)])
}

fn default_pairs() -> Vec<PairConfig> {
    vec![
        PairConfig {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            synonyms: vec!["bitcoin".to_string(), "btc".to_string()],
            base_price: 58_000.0,
        },
        PairConfig {
            base: "ETH".to_string(),
            quote: "USDT".to_string(),
            synonyms: vec![
                "ethereum".to_string(),
                "eth".to_string(),
                "ether".to_string(),
            ],
            base_price: 3_200.0,
        },
        PairConfig {
            base: "DOGE".to_string(),
            quote: "USDT".to_string(),
            synonyms: vec!["dogecoin".to_string(), "doge".to_string()],
            base_price: 0.12,
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quote_asset: default_quote_asset(),
            fee_pct: default_fee_pct(),
            refresh_interval_secs: default_refresh_interval_secs(),
            history_page_limit: default_history_page_limit(),
            server_port: default_server_port(),
            trade_log_path: default_trade_log_path(),
            wake_phrases: default_wake_phrases(),
            starting_balances: default_starting_balances(),
            pairs: default_pairs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let config_path = "config.yaml";
        let content = fs::read_to_string(config_path).expect("Failed to read config.yaml");

        // Strip BOM if present
        let content = content.strip_prefix("\u{feff}").unwrap_or(&content);

        let config: AppConfig = serde_yaml::from_str(content).expect("Failed to parse config.yaml");
        config
    }

    /// Fee for a given notional value, in quote-asset units.
    pub fn fee_for(&self, notional: f64) -> f64 {
        notional * self.fee_pct / 100.0
    }
}
