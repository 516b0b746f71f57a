use crate::command::intent::CommandAction;
use crate::ledger::Trade;

/// One processed command, as observed on the bus.
#[derive(Clone, Debug)]
pub struct CommandEvent {
    pub user_id: String,
    pub raw_text: String,
    pub action: CommandAction,
    /// Set when the command was rejected ("insufficient_funds", ...)
    pub error_kind: Option<String>,
    pub response_text: String,
    pub timestamp: String,
}

/// Global Event Enum
#[derive(Clone, Debug)]
pub enum Event {
    Command(CommandEvent),
    Trade(Trade),
    MarketRefresh { updated: usize, total: usize },
}
