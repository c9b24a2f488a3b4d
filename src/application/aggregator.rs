use crate::domain::entities::observation::Observation;
use crate::domain::values::aggregate::{AggregateResult, StockScores};
use std::collections::HashMap;
use std::sync::Mutex;

/// Shared sink for the observations of every worker in a crawl.
///
/// Each `record` appends under the map lock, so concurrent workers never lose
/// or interleave updates, and scores from one worker keep that worker's
/// visit order.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    entries: Mutex<HashMap<String, StockScores>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the observation's score to its stock. Observations whose stock
    /// has no symbol are dropped and `false` is returned.
    pub fn record(&self, observation: Observation) -> bool {
        let symbol = match observation.stock.symbol() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                tracing::debug!(url = %observation.page_url, "dropping observation without symbol");
                return false;
            }
        };

        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .entry(symbol)
            .or_insert_with(|| StockScores::new(observation.stock.clone()))
            .push(observation.score, observation.observed_at);
        true
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> AggregateResult {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        AggregateResult::from_entries(entries.clone())
    }
}
