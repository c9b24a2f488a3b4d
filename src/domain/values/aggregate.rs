use crate::domain::entities::stock::Stock;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Scores collected for one stock, in the order they were recorded.
#[derive(Debug, Clone, Serialize)]
pub struct StockScores {
    pub stock: Stock,
    pub scores: Vec<i64>,
    /// When the most recent score was observed.
    pub last_observed_at: Option<DateTime<Utc>>,
}

impl StockScores {
    pub fn new(stock: Stock) -> Self {
        Self {
            stock,
            scores: Vec::new(),
            last_observed_at: None,
        }
    }

    pub fn push(&mut self, score: i64, observed_at: DateTime<Utc>) {
        self.scores.push(score);
        self.last_observed_at = Some(observed_at);
    }

    pub fn total(&self) -> i64 {
        self.scores.iter().sum()
    }

    pub fn mentions(&self) -> usize {
        self.scores.len()
    }
}

/// Frozen result of one crawl: symbol → stock and its page scores.
///
/// Serializes as a list of entries in display order.
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    entries: HashMap<String, StockScores>,
}

impl AggregateResult {
    pub(crate) fn from_entries(entries: HashMap<String, StockScores>) -> Self {
        Self { entries }
    }

    pub fn scores(&self, symbol: &str) -> Option<&[i64]> {
        self.entries.get(symbol).map(|e| e.scores.as_slice())
    }

    pub fn get(&self, symbol: &str) -> Option<&StockScores> {
        self.entries.get(symbol)
    }

    /// Entries in display order (case-insensitive company name).
    pub fn sorted(&self) -> Vec<&StockScores> {
        let mut entries: Vec<&StockScores> = self.entries.values().collect();
        entries.sort_by(|a, b| a.stock.display_cmp(&b.stock));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}
