use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A tracked company, identified by its ticker symbol.
///
/// Every field is trimmed on assignment and may be absent. Identity is the
/// symbol alone: two stocks are equal only when both carry a symbol and the
/// symbols match exactly (case-sensitive). A stock without a symbol is not
/// even equal to itself, which is why `Stock` is `PartialEq` but not `Eq`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stock {
    company: Option<String>,
    symbol: Option<String>,
    exchange: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl Stock {
    pub fn new(company: impl Into<String>, symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        let mut stock = Stock::default();
        stock.set_company(Some(company.into()));
        stock.set_symbol(Some(symbol.into()));
        stock.set_exchange(Some(exchange.into()));
        stock
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    pub fn set_company(&mut self, company: Option<String>) {
        self.company = trimmed(company);
    }

    pub fn set_symbol(&mut self, symbol: Option<String>) {
        self.symbol = trimmed(symbol);
    }

    pub fn set_exchange(&mut self, exchange: Option<String>) {
        self.exchange = trimmed(exchange);
    }

    /// True when the stock carries a non-empty symbol and can be aggregated.
    pub fn has_symbol(&self) -> bool {
        self.symbol.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Display ordering: case-insensitive company name, absent names first.
    pub fn display_cmp(&self, other: &Stock) -> Ordering {
        let a = self.company.as_deref().map(str::to_lowercase);
        let b = other.company.as_deref().map(str::to_lowercase);
        a.cmp(&b)
    }

    /// Deserialization bypasses the setters, so loaders normalize through here.
    pub(crate) fn normalized(self) -> Self {
        Stock {
            company: trimmed(self.company),
            symbol: trimmed(self.symbol),
            exchange: trimmed(self.exchange),
        }
    }
}

impl PartialEq for Stock {
    fn eq(&self, other: &Self) -> bool {
        match (&self.symbol, &other.symbol) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.company.as_deref().unwrap_or("?"),
            self.exchange.as_deref().unwrap_or("?"),
            self.symbol.as_deref().unwrap_or("?")
        )
    }
}
