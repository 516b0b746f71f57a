//! Unit tests for the execution engine - the command state machine.

#[cfg(test)]
mod engine_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;

    use crate::bus::EventBus;
    use crate::command::intent::{CommandAction, CommandData, Intent, OrderKind, Side};
    use crate::config::AppConfig;
    use crate::data::cache::{MarketCache, Quote};
    use crate::engine::ExecutionEngine;
    use crate::ledger::store::InMemoryStore;
    use crate::ledger::{Ledger, TradeStatus};
    use crate::response;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            change_24h: 2.1,
            volume: 5_000_000.0,
            as_of: Utc::now(),
        }
    }

    /// Engine with BTC and ETH quotes cached (DOGE deliberately left
    /// uncached) and a fresh ledger seeded with the given USDT balance.
    fn engine(usdt: f64) -> (ExecutionEngine, Arc<InMemoryStore>) {
        let config = AppConfig::default();
        let store = Arc::new(InMemoryStore::new());
        let ledger = Ledger::new(
            store.clone(),
            HashMap::from([("USDT".to_string(), usdt)]),
            config.fee_pct,
        );
        let cache = MarketCache::new();
        cache.insert(quote("BTC/USDT", 58_000.0));
        cache.insert(quote("ETH/USDT", 3_200.0));

        let bus = EventBus::new(100);
        (ExecutionEngine::new(&config, cache, ledger, bus), store)
    }

    #[tokio::test]
    async fn test_market_buy_executes() {
        let (engine, store) = engine(10_000.0);

        let result = engine.interpret_command("buy 0.1 bitcoin", "alice").await;

        assert_eq!(result.action, CommandAction::Trade);
        match &result.data {
            CommandData::Trade(trade) => {
                assert_eq!(trade.symbol, "BTC/USDT");
                assert_eq!(trade.side, Side::Buy);
                assert_eq!(trade.kind, OrderKind::Market);
                assert_eq!(trade.quantity, 0.1);
                assert_eq!(trade.price, 58_000.0);
                assert_eq!(trade.status, TradeStatus::Simulated);
            }
            other => panic!("Expected trade data, got {:?}", other),
        }
        assert!(result.response_text.starts_with("Bought 0.1 BTC"));

        // 5800 + 5.80 fee debited, 0.1 BTC credited
        let usdt = engine.ledger().balance("alice", "USDT").await;
        assert!((usdt - 4_194.2).abs() < 1e-6);
        assert!((engine.ledger().balance("alice", "BTC").await - 0.1).abs() < 1e-12);
        assert_eq!(store.trade_count(), 1);
    }

    #[tokio::test]
    async fn test_limit_order_fills_at_requested_price() {
        let (engine, _) = engine(10_000.0);

        let result = engine
            .interpret_command("buy 0.1 bitcoin at 50000", "alice")
            .await;

        assert_eq!(result.action, CommandAction::Trade);
        match &result.data {
            CommandData::Trade(trade) => {
                assert_eq!(trade.kind, OrderKind::Limit);
                // Fills at the requested price, not the cached 58000
                assert_eq!(trade.price, 50_000.0);
            }
            other => panic!("Expected trade data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quote_request_returns_cached_quote() {
        let (engine, _) = engine(10_000.0);

        let result = engine
            .interpret_command("what's the price of ethereum", "alice")
            .await;

        assert_eq!(result.action, CommandAction::Quote);
        match &result.data {
            CommandData::Quote(q) => {
                assert_eq!(q.symbol, "ETH/USDT");
                assert_eq!(q.price, 3_200.0);
            }
            other => panic!("Expected quote data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_symbol_vs_market_data_unavailable() {
        let (engine, _) = engine(10_000.0);

        // DOGE is a supported pair but has no cached quote: the user hears
        // "no data yet", not "unknown asset".
        let uncached = engine
            .interpret_command("what's the price of dogecoin", "alice")
            .await;
        assert_eq!(uncached.action, CommandAction::Error);
        match &uncached.data {
            CommandData::Error { error, .. } => {
                assert_eq!(error, "market_data_unavailable")
            }
            other => panic!("Expected error data, got {:?}", other),
        }

        // floopcoin is not a supported pair at all
        let unknown = engine
            .interpret_command("what's the price of floopcoin", "alice")
            .await;
        match &unknown.data {
            CommandData::Error { error, .. } => assert_eq!(error, "unknown_symbol"),
            other => panic!("Expected error data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_market_order_without_quote_rejected() {
        let (engine, store) = engine(10_000.0);

        let result = engine
            .interpret_command("buy 100 dogecoin", "alice")
            .await;

        assert_eq!(result.action, CommandAction::Error);
        match &result.data {
            CommandData::Error { error, .. } => {
                assert_eq!(error, "market_data_unavailable")
            }
            other => panic!("Expected error data, got {:?}", other),
        }
        assert_eq!(store.trade_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_command_rejected() {
        let (engine, _) = engine(10_000.0);

        let result = engine
            .interpret_command("make me a sandwich", "alice")
            .await;

        assert_eq!(result.action, CommandAction::Error);
        assert!(matches!(result.intent, Intent::Unrecognized { .. }));
        assert_eq!(
            result.response_text,
            "I'm sorry, I didn't understand that command."
        );
    }

    #[tokio::test]
    async fn test_sell_without_inventory_rejected() {
        let (engine, store) = engine(10_000.0);

        let result = engine.interpret_command("sell 1 bitcoin", "alice").await;

        assert_eq!(result.action, CommandAction::Error);
        match &result.data {
            CommandData::Error {
                error, shortfall, ..
            } => {
                assert_eq!(error, "insufficient_inventory");
                assert_eq!(*shortfall, Some(1.0));
            }
            other => panic!("Expected error data, got {:?}", other),
        }

        // No balance change, no trade appended
        assert_eq!(engine.ledger().balance("alice", "USDT").await, 10_000.0);
        assert_eq!(store.trade_count(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_names_shortfall() {
        let (engine, _) = engine(100.0);

        let result = engine.interpret_command("buy 1 bitcoin", "alice").await;

        match &result.data {
            CommandData::Error {
                error, shortfall, ..
            } => {
                assert_eq!(error, "insufficient_funds");
                // 58000 + 58 fee - 100 available
                let short = shortfall.unwrap();
                assert!((short - 57_958.0).abs() < 1e-6);
            }
            other => panic!("Expected error data, got {:?}", other),
        }
        assert!(result.response_text.contains("short"));
    }

    #[tokio::test]
    async fn test_format_round_trip_matches_action() {
        let (engine, _) = engine(10_000.0);

        for command in [
            "buy 0.1 bitcoin",
            "what's the price of ethereum",
            "sell 5 bitcoin",
            "complete gibberish",
        ] {
            let result = engine.interpret_command(command, "alice").await;

            // Re-deriving the text from the result reproduces response_text,
            // and the data variant always agrees with the action.
            assert_eq!(response::format(&result), result.response_text);
            match (&result.action, &result.data) {
                (CommandAction::Quote, CommandData::Quote(_)) => {}
                (CommandAction::Trade, CommandData::Trade(_)) => {}
                (CommandAction::Error, CommandData::Error { .. }) => {}
                (action, data) => panic!("action {:?} disagrees with data {:?}", action, data),
            }
        }
    }

    #[tokio::test]
    async fn test_users_do_not_share_accounts() {
        let (engine, _) = engine(10_000.0);

        engine.interpret_command("buy 0.1 bitcoin", "alice").await;

        assert!((engine.ledger().balance("alice", "BTC").await - 0.1).abs() < 1e-12);
        assert_eq!(engine.ledger().balance("bob", "BTC").await, 0.0);
        assert_eq!(engine.ledger().balance("bob", "USDT").await, 10_000.0);
    }

    #[tokio::test]
    async fn test_command_events_published() {
        let config = AppConfig::default();
        let store = Arc::new(InMemoryStore::new());
        let ledger = Ledger::new(
            store,
            HashMap::from([("USDT".to_string(), 10_000.0)]),
            config.fee_pct,
        );
        let cache = MarketCache::new();
        cache.insert(quote("BTC/USDT", 58_000.0));
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let engine = ExecutionEngine::new(&config, cache, ledger, bus);
        engine.interpret_command("buy 0.1 bitcoin", "alice").await;

        // A trade event then a command event land on the bus
        let mut saw_trade = false;
        let mut saw_command = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                crate::events::Event::Trade(t) => {
                    saw_trade = true;
                    assert_eq!(t.user_id, "alice");
                }
                crate::events::Event::Command(c) => {
                    saw_command = true;
                    assert_eq!(c.action, CommandAction::Trade);
                }
                _ => {}
            }
        }
        assert!(saw_trade && saw_command);
    }
}
