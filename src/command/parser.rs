//! Free-form command parsing.
//!
//! Turns a raw transcript ("hey tradebot, buy 0.1 bitcoin at 58000") into a
//! typed `Intent`. Pure function over the symbol table: no I/O, never fails.
//! Unparseable input yields `Intent::Unrecognized`.

use crate::command::intent::{Intent, OrderKind, Side};
use crate::symbols::SymbolTable;

/// Words that signal a price/indicator query. Indicator-specific sub-intents
/// (rsi, macd) are folded into plain quote lookups.
const QUOTE_KEYWORDS: &[&str] = &[
    "price", "what's", "whats", "value", "worth", "show", "display", "chart", "rsi", "macd",
    "current", "latest",
];

/// Filler words skipped when hunting for the asset token of a quote query.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "for", "me", "is", "in", "on", "to", "my", "it", "please", "now",
    "today", "how", "much", "many", "what", "and",
];

/// Tokens that introduce a limit price ("at 58000", "when it hits 60000",
/// "when it drops to 50000", "when it reaches 60000").
const PRICE_QUALIFIERS: &[&str] = &["at", "hits", "reaches", "drops"];

pub struct CommandParser {
    table: SymbolTable,
    /// Lowercased, longest first so "hey tradebot" wins over "tradebot".
    wake_phrases: Vec<String>,
}

impl CommandParser {
    pub fn new(table: SymbolTable, wake_phrases: &[String]) -> Self {
        let mut phrases: Vec<String> = wake_phrases.iter().map(|p| p.to_lowercase()).collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));
        Self {
            table,
            wake_phrases: phrases,
        }
    }

    pub fn parse(&self, raw: &str) -> Intent {
        let text = self.normalize(raw);
        let tokens = tokenize(&text);

        if tokens.is_empty() {
            return Intent::Unrecognized {
                raw_text: raw.to_string(),
            };
        }

        // Order intent takes precedence: "buy bitcoin at the current price"
        // is an order, not a quote. Once a side keyword is seen the command
        // is an order or nothing.
        let side_hit = tokens
            .iter()
            .enumerate()
            .find_map(|(i, t)| side_keyword(t).map(|s| (i, s)));
        if let Some((side_idx, side)) = side_hit {
            return self
                .parse_order(&tokens, side_idx, side)
                .unwrap_or_else(|| Intent::Unrecognized {
                    raw_text: raw.to_string(),
                });
        }

        if tokens.iter().any(|t| QUOTE_KEYWORDS.contains(&t.as_str())) {
            if let Some(intent) = self.parse_quote(&tokens) {
                return intent;
            }
        }

        Intent::Unrecognized {
            raw_text: raw.to_string(),
        }
    }

    fn parse_order(&self, tokens: &[String], side_idx: usize, side: Side) -> Option<Intent> {
        let rest = &tokens[side_idx + 1..];

        let qualifier_idx = rest
            .iter()
            .position(|t| PRICE_QUALIFIERS.contains(&t.as_str()));

        // Quantity is the first numeric token after the side keyword that is
        // not part of the price-qualifier clause.
        let quantity_scope = match qualifier_idx {
            Some(q) => &rest[..q],
            None => rest,
        };
        let quantity = quantity_scope.iter().find_map(|t| parse_number(t))?;
        if quantity <= 0.0 {
            return None;
        }

        let pair = tokens.iter().find_map(|t| self.table.resolve(t))?;

        // A qualifier with no trailing number leaves the order a market order.
        let limit_price = qualifier_idx
            .and_then(|q| rest[q + 1..].iter().find_map(|t| parse_number(t)))
            .filter(|p| *p > 0.0);

        let kind = if limit_price.is_some() {
            OrderKind::Limit
        } else {
            OrderKind::Market
        };

        Some(Intent::PlaceOrder {
            symbol: pair.symbol.clone(),
            side,
            kind,
            quantity,
            limit_price,
        })
    }

    fn parse_quote(&self, tokens: &[String]) -> Option<Intent> {
        if let Some(pair) = tokens.iter().find_map(|t| self.table.resolve(t)) {
            return Some(Intent::QuoteRequest {
                symbol: pair.symbol.clone(),
            });
        }

        // No supported asset named: carry the best candidate token so the
        // engine can report UnknownSymbol ("price of floopcoin") instead of
        // silently dropping it.
        let candidate = tokens
            .iter()
            .rev()
            .find(|t| {
                !QUOTE_KEYWORDS.contains(&t.as_str())
                    && !STOPWORDS.contains(&t.as_str())
                    && parse_number(t).is_none()
            })?;

        Some(Intent::QuoteRequest {
            symbol: candidate.clone(),
        })
    }

    /// Lowercase, trim, and strip one leading wake phrase if present.
    fn normalize(&self, raw: &str) -> String {
        const BOUNDARY: &[char] = &[' ', ',', '.', '!', '?'];

        let mut text = raw.trim().to_lowercase();

        for phrase in &self.wake_phrases {
            if let Some(stripped) = text.strip_prefix(phrase.as_str()) {
                // Only treat it as a wake phrase on a word boundary.
                if stripped.is_empty() || stripped.starts_with(BOUNDARY) {
                    text = stripped.trim_start_matches(BOUNDARY).to_string();
                    break;
                }
            }
        }

        text
    }
}

fn side_keyword(token: &str) -> Option<Side> {
    match token {
        "buy" | "purchase" => Some(Side::Buy),
        "sell" => Some(Side::Sell),
        _ => None,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| ",.?!;:\"()".contains(c)).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse a numeric token, accepting "$58,000.50" style input.
fn parse_number(token: &str) -> Option<f64> {
    let cleaned = token.trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
