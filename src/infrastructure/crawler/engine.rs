//! Worker-pool crawl engine over a shared frontier.
//!
//! Each worker owns one [`PageVisitor`] and loops: take a URL from the
//! frontier, honour the per-host politeness delay, fetch, let the visitor
//! filter the page's links, then hand the page to the visitor on the blocking
//! pool. Where pages come from is a [`PageSource`]: HTTP for real crawls, an
//! in-memory web for dry runs.

use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::{
    shutdown_channel, CrawlEngine, CrawlRun, CrawlStats, Page, PageVisitor, ShutdownSignal,
    VisitorFactory,
};
use crate::domain::values::crawl_config::CrawlConfig;
use crate::infrastructure::crawler::frontier::Frontier;
use crate::infrastructure::crawler::http_source::HttpPageSource;
use crate::infrastructure::crawler::politeness::Politeness;
use crate::infrastructure::crawler::{FetchOutcome, PageSource};
use crate::infrastructure::sqlite::frontier_store::FrontierStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type SourceBuilder = dyn Fn(&CrawlConfig) -> Result<Arc<dyn PageSource>, DomainError> + Send + Sync;

pub struct FrontierCrawlEngine {
    name: String,
    build_source: Box<SourceBuilder>,
}

impl FrontierCrawlEngine {
    /// Fetches over HTTP with a client built from each crawl's config.
    pub fn http() -> Self {
        Self {
            name: "http".into(),
            build_source: Box::new(|config| {
                let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::new(config)?);
                Ok(source)
            }),
        }
    }

    /// Crawls a fixed source, whatever the config says about transport.
    pub fn with_source(source: Arc<dyn PageSource>) -> Self {
        Self {
            name: source.name().to_string(),
            build_source: Box::new(move |_| Ok(source.clone())),
        }
    }
}

/// Schemes the engine can fetch under `config`.
fn admissible(url: &str, config: &CrawlConfig) -> bool {
    match url::Url::parse(url) {
        Ok(u) => match u.scheme() {
            "http" => true,
            "https" => config.include_https_pages,
            _ => false,
        },
        Err(_) => false,
    }
}

#[derive(Debug, Default)]
struct Counters {
    pages_fetched: AtomicU64,
    links_scheduled: AtomicU64,
    fetch_failures: AtomicU64,
    pages_skipped: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn fill(&self, mut stats: CrawlStats) -> CrawlStats {
        stats.pages_fetched = self.pages_fetched.load(Ordering::Relaxed);
        stats.links_scheduled = self.links_scheduled.load(Ordering::Relaxed);
        stats.fetch_failures = self.fetch_failures.load(Ordering::Relaxed);
        stats.pages_skipped = self.pages_skipped.load(Ordering::Relaxed);
        stats
    }
}

struct Worker {
    id: usize,
    visitor: Option<Box<dyn PageVisitor>>,
    source: Arc<dyn PageSource>,
    frontier: Arc<Frontier>,
    politeness: Arc<Politeness>,
    counters: Arc<Counters>,
    config: Arc<CrawlConfig>,
    shutdown: ShutdownSignal,
}

impl Worker {
    async fn run(mut self) {
        while let Some((url, depth)) = self.frontier.next(&mut self.shutdown).await {
            let wait = self.politeness.reserve(&url);
            if !wait.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = self.shutdown.requested() => {
                        self.frontier.abandon(&url);
                        break;
                    }
                }
            }

            match self.source.fetch(&url, depth).await {
                Ok(FetchOutcome::Page(page)) => {
                    Counters::bump(&self.counters.pages_fetched, 1);
                    self.schedule_links(&page);
                    if !self.visit(page).await {
                        self.frontier.complete(&url);
                        return;
                    }
                }
                Ok(FetchOutcome::Skipped(reason)) => {
                    Counters::bump(&self.counters.pages_skipped, 1);
                    tracing::debug!(worker = self.id, url = %url, reason = %reason, "page skipped");
                }
                Err(e) => {
                    Counters::bump(&self.counters.fetch_failures, 1);
                    tracing::warn!(worker = self.id, url = %url, error = %e, "fetch failed");
                }
            }
            self.frontier.complete(&url);
        }

        if let Some(visitor) = self.visitor.as_mut() {
            visitor.on_before_exit();
        }
    }

    /// Ask the visitor about every outgoing link before the page is visited.
    fn schedule_links(&mut self, page: &Page) {
        let child_depth = page.depth + 1;
        if !self.config.allows_depth(child_depth) {
            return;
        }
        let Some(visitor) = self.visitor.as_mut() else {
            return;
        };
        let config = &self.config;
        let links: Vec<String> = page
            .outgoing_links
            .iter()
            .filter(|link| admissible(link, config))
            .filter(|link| visitor.should_visit(page, link))
            .cloned()
            .collect();
        let added = self.frontier.schedule(links, child_depth);
        Counters::bump(&self.counters.links_scheduled, added as u64);
    }

    /// Runs the visitor off the async executor. Returns `false` if the
    /// visitor panicked and the worker has to stop.
    async fn visit(&mut self, page: Page) -> bool {
        let Some(mut visitor) = self.visitor.take() else {
            return false;
        };
        let url = page.url.clone();
        match tokio::task::spawn_blocking(move || {
            visitor.visit(&page);
            visitor
        })
        .await
        {
            Ok(visitor) => {
                self.visitor = Some(visitor);
                true
            }
            Err(e) => {
                tracing::error!(worker = self.id, url = %url, error = %e, "visitor panicked, worker exiting");
                false
            }
        }
    }
}

#[async_trait]
impl CrawlEngine for FrontierCrawlEngine {
    async fn start(
        &self,
        config: &CrawlConfig,
        seeds: Vec<String>,
        factory: Arc<dyn VisitorFactory>,
    ) -> Result<CrawlRun, DomainError> {
        config.validate()?;
        let source = (self.build_source)(config)?;

        let store = if config.resumable_crawling {
            Some(FrontierStore::open(&config.crawl_storage_folder)?)
        } else {
            None
        };
        let frontier = Arc::new(Frontier::new(store, config.max_pages_to_fetch));
        if config.resumable_crawling {
            let resumed = frontier.resume()?;
            if resumed > 0 {
                tracing::info!(pending = resumed, "resuming crawl from stored frontier");
            }
        }

        let seeds: Vec<String> = seeds
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| {
                let ok = admissible(s, config);
                if !ok {
                    tracing::warn!(seed = %s, "seed url not crawlable with this config");
                }
                ok
            })
            .collect();
        let scheduled = frontier.schedule(seeds, 0);
        if frontier.pending() == 0 {
            tracing::info!("nothing to crawl, frontier is empty");
        }

        let stats = CrawlStats::new();
        let counters = Arc::new(Counters::default());
        Counters::bump(&counters.links_scheduled, scheduled as u64);

        let (handle, signal) = shutdown_channel();
        let politeness = Arc::new(Politeness::new(config.politeness_delay()));
        let config = Arc::new(config.clone());

        tracing::info!(run_id = %stats.run_id, source = source.name(), workers = config.number_of_crawlers, "crawl engine started");

        let workers: Vec<_> = (0..config.number_of_crawlers)
            .map(|id| {
                let worker = Worker {
                    id,
                    visitor: Some(factory.new_visitor(id)),
                    source: source.clone(),
                    frontier: frontier.clone(),
                    politeness: politeness.clone(),
                    counters: counters.clone(),
                    config: config.clone(),
                    shutdown: signal.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let finished = tokio::spawn(async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    tracing::error!(error = %e, "crawl worker failed");
                }
            }
            // A drained frontier has nothing left to resume.
            if !signal.is_shutdown() && frontier.pending() == 0 {
                if let Err(e) = frontier.clear_store() {
                    tracing::warn!(error = %e, "could not clear stored frontier");
                }
            }
            let stats = counters.fill(stats).finish();
            tracing::info!(
                run_id = %stats.run_id,
                fetched = stats.pages_fetched,
                failures = stats.fetch_failures,
                pending = frontier.pending(),
                "crawl engine stopped"
            );
            stats
        });

        Ok(CrawlRun::new(handle, finished))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
