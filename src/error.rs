//! Custom error types for the command engine
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// User-facing command failures. Every variant except `LedgerInconsistency`
/// is an expected outcome: it is returned as a rejected `CommandResult`,
/// never propagated as a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Could not understand command: {raw}")]
    UnparseableCommand { raw: String },

    #[error("Unknown symbol: {token}")]
    UnknownSymbol { token: String },

    #[error("No market data available for {symbol}")]
    MarketDataUnavailable { symbol: String },

    #[error("Insufficient {asset} balance: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: f64,
        available: f64,
    },

    #[error("Insufficient {asset} holdings: required {required}, available {available}")]
    InsufficientInventory {
        asset: String,
        required: f64,
        available: f64,
    },

    /// Invariant breach inside the ledger. Fatal for the command; the
    /// attempted mutation is rolled back and the breach is logged loudly.
    #[error("Ledger inconsistency: {detail}")]
    LedgerInconsistency { detail: String },
}

impl CommandError {
    /// Stable machine-readable kind, used by the formatter templates and the
    /// reporter's structured log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::UnparseableCommand { .. } => "unparseable_command",
            CommandError::UnknownSymbol { .. } => "unknown_symbol",
            CommandError::MarketDataUnavailable { .. } => "market_data_unavailable",
            CommandError::InsufficientFunds { .. } => "insufficient_funds",
            CommandError::InsufficientInventory { .. } => "insufficient_inventory",
            CommandError::LedgerInconsistency { .. } => "ledger_inconsistency",
        }
    }

    /// Shortfall amount for balance errors, if applicable.
    pub fn shortfall(&self) -> Option<f64> {
        match self {
            CommandError::InsufficientFunds {
                required, available, ..
            }
            | CommandError::InsufficientInventory {
                required, available, ..
            } => Some(required - available),
            _ => None,
        }
    }
}

/// Quote provider failures. Confined to the refresh path: a failed fetch
/// keeps the previous cached quote and is retried on the next tick.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Symbol not served by provider: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("Fetch failed for {symbol}: {reason}")]
    FetchFailed { symbol: String, reason: String },
}
