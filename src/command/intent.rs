use serde::{Deserialize, Serialize};

use crate::data::cache::Quote;
use crate::error::CommandError;
use crate::ledger::Trade;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Market,
    Limit,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Market => "market",
            OrderKind::Limit => "limit",
        }
    }
}

/// What a command asked for. Produced once per command by the parser,
/// immutable, consumed by the execution engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// `symbol` is the canonical pair when the asset token resolved, or the
    /// raw token when it did not (the engine turns the latter into
    /// `UnknownSymbol` rather than the parser guessing).
    QuoteRequest { symbol: String },
    PlaceOrder {
        symbol: String,
        side: Side,
        kind: OrderKind,
        quantity: f64,
        limit_price: Option<f64>,
    },
    Unrecognized { raw_text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Quote,
    Trade,
    Error,
    Info,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::Quote => "quote",
            CommandAction::Trade => "trade",
            CommandAction::Error => "error",
            CommandAction::Info => "info",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandData {
    Quote(Quote),
    Trade(Trade),
    Error {
        error: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        shortfall: Option<f64>,
    },
    None,
}

impl CommandData {
    pub fn from_error(err: &CommandError) -> Self {
        CommandData::Error {
            error: err.kind().to_string(),
            message: err.to_string(),
            shortfall: err.shortfall(),
        }
    }
}

/// The structured outcome of one command: what was understood, what happened,
/// and the text handed to the UI / speech layer. Ephemeral, not persisted.
#[derive(Clone, Debug, Serialize)]
pub struct CommandResult {
    pub intent: Intent,
    pub action: CommandAction,
    pub data: CommandData,
    pub response_text: String,
}
