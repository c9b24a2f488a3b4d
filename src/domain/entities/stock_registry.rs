use crate::domain::entities::stock::Stock;
use std::collections::HashMap;

/// Immutable set of stocks of interest, keyed by symbol.
///
/// Built once at startup and shared read-only. Stocks without a symbol are
/// dropped on construction; a later duplicate symbol replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct StockRegistry {
    by_symbol: HashMap<String, Stock>,
}

impl StockRegistry {
    pub fn new(stocks: impl IntoIterator<Item = Stock>) -> Self {
        let by_symbol = stocks
            .into_iter()
            .filter(Stock::has_symbol)
            .filter_map(|s| s.symbol().map(str::to_string).map(|sym| (sym, s)))
            .collect();
        Self { by_symbol }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&Stock> {
        self.by_symbol.get(symbol)
    }

    /// Non-empty company names, the pattern source for the entity matcher.
    pub fn company_names(&self) -> Vec<&str> {
        self.by_symbol
            .values()
            .filter_map(Stock::company)
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}
