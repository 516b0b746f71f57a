//! Unit tests for the command parser - intent recognition, quantity and
//! limit-price extraction, wake-phrase handling.

#[cfg(test)]
mod parser_tests {
    use crate::command::intent::{Intent, OrderKind, Side};
    use crate::command::parser::CommandParser;
    use crate::config::AppConfig;
    use crate::symbols::SymbolTable;

    fn parser() -> CommandParser {
        let config = AppConfig::default();
        let table = SymbolTable::from_config(&config.pairs);
        CommandParser::new(table, &config.wake_phrases)
    }

    // ============= Order Intent Tests =============

    #[test]
    fn test_parse_market_buy() {
        let intent = parser().parse("buy 0.1 bitcoin");

        assert_eq!(
            intent,
            Intent::PlaceOrder {
                symbol: "BTC/USDT".to_string(),
                side: Side::Buy,
                kind: OrderKind::Market,
                quantity: 0.1,
                limit_price: None,
            }
        );
    }

    #[test]
    fn test_parse_market_sell() {
        let intent = parser().parse("sell 2 eth");

        assert_eq!(
            intent,
            Intent::PlaceOrder {
                symbol: "ETH/USDT".to_string(),
                side: Side::Sell,
                kind: OrderKind::Market,
                quantity: 2.0,
                limit_price: None,
            }
        );
    }

    #[test]
    fn test_parse_purchase_synonym() {
        let intent = parser().parse("purchase 100 dogecoin");

        match intent {
            Intent::PlaceOrder { symbol, side, .. } => {
                assert_eq!(symbol, "DOGE/USDT");
                assert_eq!(side, Side::Buy);
            }
            other => panic!("Expected PlaceOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_limit_buy_with_at() {
        let intent = parser().parse("buy 0.5 bitcoin at 55000");

        assert_eq!(
            intent,
            Intent::PlaceOrder {
                symbol: "BTC/USDT".to_string(),
                side: Side::Buy,
                kind: OrderKind::Limit,
                quantity: 0.5,
                limit_price: Some(55_000.0),
            }
        );
    }

    #[test]
    fn test_parse_limit_sell_when_it_hits() {
        let intent = parser().parse("sell 1 ethereum when it hits 4000");

        assert_eq!(
            intent,
            Intent::PlaceOrder {
                symbol: "ETH/USDT".to_string(),
                side: Side::Sell,
                kind: OrderKind::Limit,
                quantity: 1.0,
                limit_price: Some(4_000.0),
            }
        );
    }

    #[test]
    fn test_parse_limit_when_it_drops_to() {
        let intent = parser().parse("buy 0.2 btc when it drops to 50000");

        match intent {
            Intent::PlaceOrder {
                kind, limit_price, ..
            } => {
                assert_eq!(kind, OrderKind::Limit);
                assert_eq!(limit_price, Some(50_000.0));
            }
            other => panic!("Expected PlaceOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_dollar_and_comma_in_price() {
        let intent = parser().parse("buy 0.1 bitcoin at $58,000");

        match intent {
            Intent::PlaceOrder {
                quantity,
                limit_price,
                ..
            } => {
                assert_eq!(quantity, 0.1);
                assert_eq!(limit_price, Some(58_000.0));
            }
            other => panic!("Expected PlaceOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_qualifier_without_number_stays_market() {
        // "at the current price" has no number after the qualifier
        let intent = parser().parse("buy 0.1 bitcoin at the current price");

        match intent {
            Intent::PlaceOrder {
                kind, limit_price, ..
            } => {
                assert_eq!(kind, OrderKind::Market);
                assert_eq!(limit_price, None);
            }
            other => panic!("Expected PlaceOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_order_beats_quote_keywords() {
        // Tie-break: order keyword + quote keyword is still an order
        let intent = parser().parse("buy 1 bitcoin at the current price");
        assert!(matches!(intent, Intent::PlaceOrder { side: Side::Buy, .. }));
    }

    // ============= Quantity Validation Tests =============

    #[test]
    fn test_missing_quantity_is_unrecognized() {
        let intent = parser().parse("buy bitcoin");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    #[test]
    fn test_zero_quantity_is_unrecognized() {
        let intent = parser().parse("buy 0 bitcoin");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    #[test]
    fn test_negative_quantity_is_unrecognized() {
        let intent = parser().parse("buy -3 bitcoin");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    #[test]
    fn test_non_numeric_quantity_is_unrecognized() {
        let intent = parser().parse("buy some bitcoin");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    #[test]
    fn test_unknown_asset_order_is_unrecognized() {
        let intent = parser().parse("buy 5 floopcoin");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    // ============= Quote Intent Tests =============

    #[test]
    fn test_parse_price_query() {
        let intent = parser().parse("what's the price of ethereum");

        assert_eq!(
            intent,
            Intent::QuoteRequest {
                symbol: "ETH/USDT".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_show_me_query() {
        let intent = parser().parse("show me the bitcoin chart");

        assert_eq!(
            intent,
            Intent::QuoteRequest {
                symbol: "BTC/USDT".to_string(),
            }
        );
    }

    #[test]
    fn test_indicator_query_folds_to_quote() {
        let intent = parser().parse("what's the rsi for btc");

        assert_eq!(
            intent,
            Intent::QuoteRequest {
                symbol: "BTC/USDT".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_asset_quote_carries_raw_token() {
        // The engine distinguishes UnknownSymbol from MarketDataUnavailable,
        // so the parser must hand it the unresolved token.
        let intent = parser().parse("what's the price of floopcoin");

        assert_eq!(
            intent,
            Intent::QuoteRequest {
                symbol: "floopcoin".to_string(),
            }
        );
    }

    #[test]
    fn test_quote_without_asset_is_unrecognized() {
        let intent = parser().parse("show me the price");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    // ============= Wake Phrase Tests =============

    #[test]
    fn test_wake_phrase_is_stripped() {
        let intent = parser().parse("hey tradebot, buy 0.1 bitcoin");
        assert!(matches!(intent, Intent::PlaceOrder { .. }));
    }

    #[test]
    fn test_wake_phrase_case_insensitive() {
        let intent = parser().parse("Hey Tradebot buy 0.1 BITCOIN");
        assert!(matches!(intent, Intent::PlaceOrder { .. }));
    }

    #[test]
    fn test_wake_phrase_alone_is_unrecognized() {
        let intent = parser().parse("hey tradebot");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    // ============= Fallback Tests =============

    #[test]
    fn test_gibberish_is_unrecognized() {
        let intent = parser().parse("make me a sandwich");

        assert_eq!(
            intent,
            Intent::Unrecognized {
                raw_text: "make me a sandwich".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_input_is_unrecognized() {
        let intent = parser().parse("   ");
        assert!(matches!(intent, Intent::Unrecognized { .. }));
    }

    #[test]
    fn test_canonical_symbol_token_resolves() {
        let intent = parser().parse("buy 0.1 BTC/USDT");

        match intent {
            Intent::PlaceOrder { symbol, .. } => assert_eq!(symbol, "BTC/USDT"),
            other => panic!("Expected PlaceOrder, got {:?}", other),
        }
    }
}
