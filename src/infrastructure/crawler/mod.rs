pub mod engine;
pub mod frontier;
pub mod html;
pub mod http_source;
pub mod memory;
pub mod politeness;

use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::Page;
use async_trait::async_trait;

/// Result of fetching one scheduled URL.
#[derive(Debug)]
pub enum FetchOutcome {
    Page(Page),
    /// Fetched but not worth visiting (too large, binary, ...).
    Skipped(String),
}

/// Where the frontier engine gets page bodies from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str, depth: u32) -> Result<FetchOutcome, DomainError>;

    fn name(&self) -> &str;
}
