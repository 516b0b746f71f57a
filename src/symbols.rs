//! Supported trading pairs and spoken-name resolution.
//!
//! Canonical symbol (used internally): "BASE/QUOTE" like "BTC/USDT".
//! The pair set is closed: it is built once from configuration and never
//! grows at runtime. Synonym collisions resolve to the first configured
//! pair.

use std::collections::HashMap;

use crate::config::PairConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct Pair {
    pub symbol: String,
    pub base: String,
    pub quote: String,
}

#[derive(Clone, Debug)]
pub struct SymbolTable {
    pairs: Vec<Pair>,
    /// lowercase token (synonym, base code, "btc/usdt", "btcusdt") -> pair index
    lookup: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn from_config(configs: &[PairConfig]) -> Self {
        let mut pairs = Vec::with_capacity(configs.len());
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for cfg in configs {
            let idx = pairs.len();
            let pair = Pair {
                symbol: cfg.symbol(),
                base: cfg.base.to_uppercase(),
                quote: cfg.quote.to_uppercase(),
            };

            let mut tokens: Vec<String> = vec![
                pair.base.to_lowercase(),
                pair.symbol.to_lowercase(),
                pair.symbol.to_lowercase().replace('/', ""),
            ];
            for syn in &cfg.synonyms {
                tokens.push(syn.to_lowercase());
            }

            for token in tokens {
                // First configured pair wins on collisions
                lookup.entry(token).or_insert(idx);
            }

            pairs.push(pair);
        }

        Self { pairs, lookup }
    }

    /// Resolve a spoken or typed token ("bitcoin", "btc", "BTC/USDT") to a
    /// supported pair.
    pub fn resolve(&self, token: &str) -> Option<&Pair> {
        let key = token.trim().to_lowercase();
        self.lookup.get(&key).map(|&idx| &self.pairs[idx])
    }

    /// Look up a pair by its canonical symbol, case-insensitively.
    pub fn by_symbol(&self, symbol: &str) -> Option<&Pair> {
        let wanted = symbol.trim().to_uppercase();
        self.pairs.iter().find(|p| p.symbol == wanted)
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn symbols(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.symbol.clone()).collect()
    }
}
