use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "stocksense (+https://github.com/stocksense)";
pub const DEFAULT_CRAWL_STORAGE_FOLDER: &str = "./crawl-data";
pub const DEFAULT_NUMBER_OF_CRAWLERS: usize = 2;
pub const DEFAULT_MAX_DEPTH_OF_CRAWLING: i32 = 50;
pub const DEFAULT_POLITENESS_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DOWNLOAD_SIZE: usize = 1_048_576;
pub const DEFAULT_EXPANSION_THRESHOLD: u64 = 1;

/// Settings handed to the crawl engine for one crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Worker pool size.
    pub number_of_crawlers: usize,
    /// Seeds sit at depth 0. Negative means unlimited.
    pub max_depth_of_crawling: i32,
    /// Minimum gap between two fetches to the same host.
    pub politeness_delay_ms: u64,
    pub include_https_pages: bool,
    /// When false, responses that are not text are skipped.
    pub include_binary_content: bool,
    /// Keep the frontier across runs in the storage folder.
    pub resumable_crawling: bool,
    pub user_agent: String,
    pub crawl_storage_folder: PathBuf,
    /// Larger bodies are dropped without being visited.
    pub max_download_size: usize,
    /// Visits a worker must complete before it follows any discovered link.
    pub expansion_threshold: u64,
    /// Negative means unlimited.
    pub max_pages_to_fetch: i64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            number_of_crawlers: DEFAULT_NUMBER_OF_CRAWLERS,
            max_depth_of_crawling: DEFAULT_MAX_DEPTH_OF_CRAWLING,
            politeness_delay_ms: DEFAULT_POLITENESS_DELAY_MS,
            include_https_pages: true,
            include_binary_content: false,
            resumable_crawling: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            crawl_storage_folder: PathBuf::from(DEFAULT_CRAWL_STORAGE_FOLDER),
            max_download_size: DEFAULT_MAX_DOWNLOAD_SIZE,
            expansion_threshold: DEFAULT_EXPANSION_THRESHOLD,
            max_pages_to_fetch: -1,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.number_of_crawlers == 0 {
            return Err(DomainError::Config("number_of_crawlers must be greater than 0".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(DomainError::Config("user_agent must not be empty".into()));
        }
        if self.max_download_size == 0 {
            return Err(DomainError::Config("max_download_size must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    /// Whether a page at `depth` may still be scheduled.
    pub fn allows_depth(&self, depth: u32) -> bool {
        self.max_depth_of_crawling < 0 || depth as i64 <= self.max_depth_of_crawling as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CrawlConfig::default();
        assert_eq!(cfg.number_of_crawlers, 2);
        assert_eq!(cfg.max_depth_of_crawling, 50);
        assert_eq!(cfg.politeness_delay(), Duration::from_millis(1000));
        assert!(cfg.include_https_pages);
        assert!(!cfg.include_binary_content);
        assert!(cfg.resumable_crawling);
        assert_eq!(cfg.expansion_threshold, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cfg = CrawlConfig {
            number_of_crawlers: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_depth_limits() {
        let cfg = CrawlConfig {
            max_depth_of_crawling: 1,
            ..Default::default()
        };
        assert!(cfg.allows_depth(0));
        assert!(cfg.allows_depth(1));
        assert!(!cfg.allows_depth(2));

        let unlimited = CrawlConfig {
            max_depth_of_crawling: -1,
            ..Default::default()
        };
        assert!(unlimited.allows_depth(10_000));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: CrawlConfig = serde_json::from_str(r#"{"number_of_crawlers": 4}"#).unwrap();
        assert_eq!(cfg.number_of_crawlers, 4);
        assert_eq!(cfg.politeness_delay_ms, 1000);
    }
}
