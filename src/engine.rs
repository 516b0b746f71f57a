//! The execution engine: the single entry point for commands.
//!
//! Each command moves Received -> Parsed -> {Quoted | Executed | Rejected}.
//! Terminals are final; a rejected command is never retried, the user
//! reissues it. The engine is the only writer of the ledger.

use chrono::Utc;
use tracing::{info, warn};

use crate::bus::EventBus;
use crate::command::intent::{CommandAction, CommandData, CommandResult, Intent, OrderKind, Side};
use crate::command::parser::CommandParser;
use crate::config::AppConfig;
use crate::data::cache::MarketCache;
use crate::error::CommandError;
use crate::events::{CommandEvent, Event};
use crate::ledger::Ledger;
use crate::response;
use crate::symbols::SymbolTable;

pub struct ExecutionEngine {
    parser: CommandParser,
    table: SymbolTable,
    cache: MarketCache,
    ledger: Ledger,
    event_bus: EventBus,
}

impl ExecutionEngine {
    pub fn new(
        config: &AppConfig,
        cache: MarketCache,
        ledger: Ledger,
        event_bus: EventBus,
    ) -> Self {
        let table = SymbolTable::from_config(&config.pairs);
        let parser = CommandParser::new(table.clone(), &config.wake_phrases);
        Self {
            parser,
            table,
            cache,
            ledger,
            event_bus,
        }
    }

    /// Interpret one raw utterance for one user and run it to a terminal
    /// state. Never panics on user input; every failure comes back as a
    /// rejected `CommandResult`.
    pub async fn interpret_command(&self, raw_text: &str, user_id: &str) -> CommandResult {
        let intent = self.parser.parse(raw_text);

        let result = match intent.clone() {
            Intent::Unrecognized { raw_text } => {
                self.rejected(intent, CommandError::UnparseableCommand { raw: raw_text })
            }
            Intent::QuoteRequest { symbol } => self.handle_quote(intent, &symbol),
            Intent::PlaceOrder {
                symbol,
                side,
                kind,
                quantity,
                limit_price,
            } => {
                self.handle_order(intent, user_id, &symbol, side, kind, quantity, limit_price)
                    .await
            }
        };

        match result.action {
            CommandAction::Error => {
                warn!(
                    "[ENGINE] Rejected command from {}: '{}' -> {}",
                    user_id, raw_text, result.response_text
                );
            }
            _ => {
                info!(
                    "[ENGINE] {} command from {}: '{}'",
                    result.action.as_str(),
                    user_id,
                    raw_text
                );
            }
        }

        let error_kind = match &result.data {
            CommandData::Error { error, .. } => Some(error.clone()),
            _ => None,
        };
        self.event_bus
            .publish(Event::Command(CommandEvent {
                user_id: user_id.to_string(),
                raw_text: raw_text.to_string(),
                action: result.action,
                error_kind,
                response_text: result.response_text.clone(),
                timestamp: Utc::now().to_rfc3339(),
            }))
            .ok();

        result
    }

    fn handle_quote(&self, intent: Intent, symbol: &str) -> CommandResult {
        // The parser hands over either a canonical pair symbol or the raw
        // unresolved token; only the former is a known symbol.
        let pair = match self.table.by_symbol(symbol) {
            Some(pair) => pair,
            None => {
                return self.rejected(
                    intent,
                    CommandError::UnknownSymbol {
                        token: symbol.to_string(),
                    },
                );
            }
        };

        // Known symbol with no cached data is a different failure than an
        // unknown symbol, and the user hears the difference.
        match self.cache.get(&pair.symbol) {
            Some(quote) => CommandResult {
                intent,
                action: CommandAction::Quote,
                response_text: response::quote_response(&quote),
                data: CommandData::Quote(quote),
            },
            None => self.rejected(
                intent,
                CommandError::MarketDataUnavailable {
                    symbol: pair.symbol.clone(),
                },
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_order(
        &self,
        intent: Intent,
        user_id: &str,
        symbol: &str,
        side: Side,
        kind: OrderKind,
        quantity: f64,
        limit_price: Option<f64>,
    ) -> CommandResult {
        let pair = match self.table.by_symbol(symbol) {
            Some(pair) => pair.clone(),
            None => {
                return self.rejected(
                    intent,
                    CommandError::UnknownSymbol {
                        token: symbol.to_string(),
                    },
                );
            }
        };

        // Market orders price off the cached quote. Limit orders fill
        // immediately at the requested price: this engine does not model
        // resting orders.
        let price = match (kind, limit_price) {
            (OrderKind::Limit, Some(limit)) => limit,
            _ => match self.cache.get(&pair.symbol) {
                Some(quote) => quote.price,
                None => {
                    return self.rejected(
                        intent,
                        CommandError::MarketDataUnavailable {
                            symbol: pair.symbol.clone(),
                        },
                    );
                }
            },
        };

        match self
            .ledger
            .reserve_and_settle(user_id, &pair, side, kind, quantity, price)
            .await
        {
            Ok(trade) => {
                self.event_bus.publish(Event::Trade(trade.clone())).ok();
                CommandResult {
                    intent,
                    action: CommandAction::Trade,
                    response_text: response::trade_response(&trade),
                    data: CommandData::Trade(trade),
                }
            }
            Err(err) => self.rejected(intent, err),
        }
    }

    fn rejected(&self, intent: Intent, error: CommandError) -> CommandResult {
        CommandResult {
            intent,
            action: CommandAction::Error,
            response_text: response::error_response(&error),
            data: CommandData::from_error(&error),
        }
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }
}
