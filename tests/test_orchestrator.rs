//! Crawl lifecycle: start/stop transitions, seed selection and one-shot
//! result delivery.

mod common;

use common::{default_seeds, html, setup, stocks, test_config, SEED};
use std::sync::Arc;
use std::time::Duration;
use stocksense::application::orchestrator::CrawlPhase;
use stocksense::domain::entities::stock::Stock;
use stocksense::domain::entities::stock_registry::StockRegistry;
use stocksense::domain::error::DomainError;
use stocksense::domain::values::seed_url::{SeedKind, SeedUrl};
use stocksense::infrastructure::crawler::memory::InMemoryWeb;

/// A web whose second and later pages sit behind a long politeness delay,
/// so a crawl over it keeps running until stopped.
fn slow_web() -> Arc<InMemoryWeb> {
    Arc::new(
        InMemoryWeb::new()
            .with_html(SEED, &html("Acme Corp", "Acme Corp ACME strong.", &["/1", "/2"]))
            .with_html("http://news.example/1", &html("Acme Corp", "ACME good.", &[]))
            .with_html("http://news.example/2", &html("Acme Corp", "ACME bad.", &[])),
    )
}

#[tokio::test]
async fn test_start_while_running_is_noop_and_stop_delivers() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.politeness_delay_ms = 60_000;
    let ss = setup(slow_web(), default_seeds(&[SEED]), config);

    let completion = ss.start_crawl().await.unwrap().expect("first start runs");
    assert_eq!(ss.orchestrator().phase(), CrawlPhase::Running);
    assert!(ss.start_crawl().await.unwrap().is_none());

    // Let the seed page be fetched and visited.
    tokio::time::sleep(Duration::from_millis(200)).await;
    ss.stop_crawl().await.unwrap();
    assert_eq!(ss.orchestrator().phase(), CrawlPhase::Idle);

    let report = completion.wait().await.expect("result delivered");
    assert_eq!(report.result.scores("ACME"), Some(&[1][..]));
    assert_eq!(report.stats.unwrap().pages_fetched, 1);
}

#[tokio::test]
async fn test_stop_while_idle_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let ss = setup(slow_web(), default_seeds(&[SEED]), test_config(dir.path()));
    ss.stop_crawl().await.unwrap();
    assert_eq!(ss.orchestrator().phase(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_natural_completion_returns_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let ss = setup(slow_web(), default_seeds(&[SEED]), test_config(dir.path()));

    let completion = ss.start_crawl().await.unwrap().unwrap();
    let report = completion.wait().await.unwrap();
    assert_eq!(report.result.get("ACME").unwrap().mentions(), 3);
    assert_eq!(report.result.get("ACME").unwrap().total(), 1);

    // Phase flips right after the result is sent.
    for _ in 0..50 {
        if !ss.orchestrator().is_crawling() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(ss.orchestrator().phase(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_each_crawl_gets_a_fresh_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let web = Arc::new(InMemoryWeb::new().with_html(SEED, &html("Acme Corp", "ACME strong.", &[])));
    let ss = setup(web, default_seeds(&[SEED]), test_config(dir.path()));

    let first = ss.crawl_until(std::future::pending()).await.unwrap();
    let second = ss.crawl_until(std::future::pending()).await.unwrap();
    assert_eq!(first.result.scores("ACME"), Some(&[1][..]));
    assert_eq!(second.result.scores("ACME"), Some(&[1][..]));
    assert_ne!(first.stats.unwrap().run_id, second.stats.unwrap().run_id);
}

#[tokio::test]
async fn test_no_seeds_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let ss = setup(slow_web(), Vec::new(), test_config(dir.path()));

    let result = ss.start_crawl().await;
    assert!(matches!(result, Err(DomainError::Config(_))));
    assert_eq!(ss.orchestrator().phase(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.number_of_crawlers = 0;
    let ss = setup(slow_web(), default_seeds(&[SEED]), config);

    assert!(ss.start_crawl().await.is_err());
    assert!(!ss.orchestrator().is_crawling());
}

fn variant_web() -> Arc<InMemoryWeb> {
    Arc::new(
        InMemoryWeb::new()
            .with_html("http://default.example/", &html("Default", "nothing", &[]))
            .with_html("http://simple.example/", &html("Simple", "nothing", &[])),
    )
}

fn variant_seeds() -> Vec<SeedUrl> {
    vec![
        SeedUrl::default_seed("http://default.example/"),
        SeedUrl::new("http://simple.example/", SeedKind::Test("simple".into())),
    ]
}

#[tokio::test]
async fn test_test_mode_uses_variant_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let web = variant_web();
    let ss = setup(web.clone(), variant_seeds(), test_config(dir.path()));
    ss.set_test_mode(Some("Simple".into()));

    ss.crawl_until(std::future::pending()).await.unwrap();
    assert_eq!(web.fetched(), vec!["http://simple.example/".to_string()]);
}

#[tokio::test]
async fn test_unknown_test_mode_falls_back_to_default_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let web = variant_web();
    let ss = setup(web.clone(), variant_seeds(), test_config(dir.path()));
    ss.set_test_mode(Some("complex".into()));

    ss.crawl_until(std::future::pending()).await.unwrap();
    assert_eq!(web.fetched(), vec!["http://default.example/".to_string()]);
}

#[tokio::test]
async fn test_seed_set_changes_while_idle() {
    let dir = tempfile::tempdir().unwrap();
    let ss = setup(slow_web(), default_seeds(&[SEED]), test_config(dir.path()));

    assert!(!ss.add_seed(SeedUrl::default_seed(SEED)));
    assert!(ss.add_seed(SeedUrl::default_seed("http://other.example/")));
    assert!(ss.orchestrator().remove_seed(SEED));
    assert_eq!(ss.orchestrator().seeds().len(), 1);
}

#[tokio::test]
async fn test_rebuilt_matcher_follows_new_registry() {
    let dir = tempfile::tempdir().unwrap();
    let ss = setup(slow_web(), default_seeds(&[SEED]), test_config(dir.path()));
    assert_eq!(ss.match_company("news about acme corp").as_deref(), Some("Acme Corp"));

    ss.set_stocks(StockRegistry::new([Stock::new("Initech", "INTC", "NASDAQ")]))
        .unwrap();
    assert!(ss.match_company("news about acme corp").is_none());
    assert_eq!(ss.match_company("INITECH layoffs").as_deref(), Some("Initech"));

    ss.set_stocks(stocks()).unwrap();
    assert!(ss.match_company("Globex and Acme Corp").is_some());
}

#[tokio::test]
async fn test_rebuild_refused_while_crawling() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.politeness_delay_ms = 60_000;
    let ss = setup(slow_web(), default_seeds(&[SEED]), config);

    let completion = ss.start_crawl().await.unwrap().unwrap();
    assert!(ss.set_stocks(StockRegistry::empty()).is_err());
    ss.stop_crawl().await.unwrap();
    assert!(completion.wait().await.is_some());
    assert!(ss.set_stocks(StockRegistry::empty()).is_ok());
}

#[tokio::test]
async fn test_resumed_crawl_continues_stored_frontier() {
    let dir = tempfile::tempdir().unwrap();
    let web = Arc::new(
        InMemoryWeb::new()
            .with_html(SEED, &html("Acme Corp", "Acme Corp.", &["/later"]))
            .with_html("http://news.example/later", &html("Acme Corp", "ACME strong.", &[])),
    );
    let mut config = test_config(dir.path());
    config.resumable_crawling = true;
    config.max_pages_to_fetch = 1;
    let ss = setup(web.clone(), default_seeds(&[SEED]), config.clone());

    let first = ss.crawl_until(std::future::pending()).await.unwrap();
    assert!(first.result.is_empty());
    assert_eq!(web.fetched(), vec![SEED.to_string()]);

    config.max_pages_to_fetch = -1;
    ss.orchestrator().set_config(config).unwrap();
    let second = ss.crawl_until(std::future::pending()).await.unwrap();
    assert_eq!(second.result.scores("ACME"), Some(&[1][..]));
    assert_eq!(
        web.fetched(),
        vec![SEED.to_string(), "http://news.example/later".to_string()]
    );
}
