//! Shared test helpers.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use stocksense::domain::entities::stock::Stock;
use stocksense::domain::entities::stock_registry::StockRegistry;
use stocksense::domain::values::crawl_config::CrawlConfig;
use stocksense::domain::values::lexicon::LexiconRegistry;
use stocksense::domain::values::seed_url::SeedUrl;
use stocksense::infrastructure::crawler::engine::FrontierCrawlEngine;
use stocksense::infrastructure::crawler::memory::InMemoryWeb;
use stocksense::infrastructure::nlp::rule_based::RuleBasedPipeline;
use stocksense::StockSense;

pub const SEED: &str = "http://news.example/";

pub fn stocks() -> StockRegistry {
    StockRegistry::new([
        Stock::new("Acme Corp", "ACME", "NYSE"),
        Stock::new("Globex", "GBX", "NASDAQ"),
    ])
}

pub fn lexicon() -> LexiconRegistry {
    LexiconRegistry::new(["strong", "gain", "good"], ["weak", "loss", "bad"])
}

/// Fast, non-resumable crawl that follows links from the first page on.
pub fn test_config(storage: &Path) -> CrawlConfig {
    CrawlConfig {
        number_of_crawlers: 2,
        politeness_delay_ms: 0,
        resumable_crawling: false,
        crawl_storage_folder: storage.to_path_buf(),
        expansion_threshold: 0,
        ..Default::default()
    }
}

pub fn html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!("<html><head><title>{title}</title></head><body><p>{body}</p>{anchors}</body></html>")
}

pub fn setup(web: Arc<InMemoryWeb>, seeds: Vec<SeedUrl>, config: CrawlConfig) -> StockSense {
    StockSense::with_components(
        stocks(),
        lexicon(),
        seeds,
        Arc::new(FrontierCrawlEngine::with_source(web)),
        Arc::new(RuleBasedPipeline::new()),
        config,
    )
}

pub fn default_seeds(urls: &[&str]) -> Vec<SeedUrl> {
    urls.iter().map(|u| SeedUrl::default_seed(*u)).collect()
}
