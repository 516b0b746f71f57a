//! Response templates for display and speech synthesis.
//!
//! Pure projection of a `CommandResult` into a sentence. Templates are
//! deterministic and keyed by action/error kind, so they golden-test
//! cleanly. No business logic lives here.

use crate::command::intent::{CommandData, CommandResult, Side};
use crate::data::cache::Quote;
use crate::error::CommandError;
use crate::ledger::Trade;

pub fn format(result: &CommandResult) -> String {
    match &result.data {
        CommandData::Quote(quote) => quote_response(quote),
        CommandData::Trade(trade) => trade_response(trade),
        CommandData::Error { .. } => result.response_text.clone(),
        CommandData::None => result.response_text.clone(),
    }
}

pub fn quote_response(quote: &Quote) -> String {
    let asset = base_asset(&quote.symbol);
    format!(
        "The current price of {} is ${}. It has changed {:.2}% in the last 24 hours.",
        asset,
        format_price(quote.price),
        quote.change_24h
    )
}

pub fn trade_response(trade: &Trade) -> String {
    let asset = base_asset(&trade.symbol);
    let verb = match trade.side {
        Side::Buy => "Bought",
        Side::Sell => "Sold",
    };
    format!(
        "{} {} {} at ${} for a total of ${} (fee ${}).",
        verb,
        trade.quantity,
        asset,
        format_price(trade.price),
        format_price(trade.total_value),
        format_price(trade.fee)
    )
}

pub fn error_response(error: &CommandError) -> String {
    match error {
        CommandError::UnparseableCommand { .. } => {
            "I'm sorry, I didn't understand that command.".to_string()
        }
        CommandError::UnknownSymbol { token } => {
            format!("I don't recognize '{}' as a supported asset.", token)
        }
        CommandError::MarketDataUnavailable { symbol } => {
            format!(
                "I don't have current market data for {} yet. Please try again in a moment.",
                symbol
            )
        }
        CommandError::InsufficientFunds {
            asset,
            required,
            available,
        } => format!(
            "That order needs {} {} but only {} is available. You're short {} {}.",
            format_price(*required),
            asset,
            format_price(*available),
            format_price(required - available),
            asset
        ),
        CommandError::InsufficientInventory {
            asset,
            required,
            available,
        } => format!(
            "You'd need {} {} to sell but only hold {}. You're short {} {}.",
            required,
            asset,
            available,
            required - available,
            asset
        ),
        CommandError::LedgerInconsistency { .. } => {
            "Something went wrong settling that order. No changes were made to your account."
                .to_string()
        }
    }
}

/// "BTC/USDT" -> "BTC". A bare asset code passes through untouched.
fn base_asset(symbol: &str) -> &str {
    symbol.split('/').next().unwrap_or(symbol)
}

/// Format a price with thousands separators and two decimals: 58000 ->
/// "58,000.00".
pub fn format_price(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some(parts) => parts,
        None => (formatted.as_str(), "00"),
    };

    let mut groups: Vec<String> = int_part
        .as_bytes()
        .rchunks(3)
        .map(|chunk| String::from_utf8_lossy(chunk).to_string())
        .collect();
    groups.reverse();

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, groups.join(","), frac_part)
}
