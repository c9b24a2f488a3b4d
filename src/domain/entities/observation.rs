use crate::domain::entities::stock::Stock;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One scored mention of a stock on one visited page.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub stock: Stock,
    pub score: i64,
    pub page_url: String,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(stock: Stock, score: i64, page_url: impl Into<String>) -> Self {
        Self {
            stock,
            score,
            page_url: page_url.into(),
            observed_at: Utc::now(),
        }
    }
}
