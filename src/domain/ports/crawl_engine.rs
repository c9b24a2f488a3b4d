//! Crawl engine port.
//!
//! The engine owns fetching, politeness and the frontier. The crawler
//! plugs into it through [`PageVisitor`]: one visitor per worker, created by a
//! [`VisitorFactory`] when the crawl starts.
//!
//! For every fetched page the engine first asks the page's visitor whether
//! each outgoing link should be scheduled, then hands the page itself to
//! [`PageVisitor::visit`]. Visitors rely on that ordering: the visited count a
//! worker sees while filtering a page's links does not yet include the page.

use crate::domain::error::DomainError;
use crate::domain::values::crawl_config::CrawlConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A fetched page as the engine presents it to visitors.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub url: String,
    /// Seeds are depth 0.
    pub depth: u32,
    pub title: Option<String>,
    /// Visible body text. `None` when the response was not parseable HTML.
    pub text: Option<String>,
    pub outgoing_links: Vec<String>,
    pub content_type: Option<String>,
}

/// Per-worker page logic.
pub trait PageVisitor: Send {
    /// Decide whether a link discovered on `referring_page` gets scheduled.
    /// Must not block on I/O.
    fn should_visit(&mut self, referring_page: &Page, url: &str) -> bool;

    /// Process a fetched page. May be slow; runs off the async executor.
    fn visit(&mut self, page: &Page);

    /// Called once when the worker shuts down.
    fn on_before_exit(&mut self) {}
}

pub trait VisitorFactory: Send + Sync {
    fn new_visitor(&self, worker_id: usize) -> Box<dyn PageVisitor>;
}

/// Engine-side counters for one crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub run_id: String,
    pub pages_fetched: u64,
    pub links_scheduled: u64,
    pub fetch_failures: u64,
    pub pages_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            pages_fetched: 0,
            links_scheduled: 0,
            fetch_failures: 0,
            pages_skipped: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Requests shutdown of a running crawl. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Engine side of the shutdown channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested.
    pub async fn requested(&mut self) {
        // A dropped handle can never request shutdown; wait forever.
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

/// A crawl in progress.
pub struct CrawlRun {
    shutdown: ShutdownHandle,
    finished: JoinHandle<CrawlStats>,
}

impl CrawlRun {
    pub fn new(shutdown: ShutdownHandle, finished: JoinHandle<CrawlStats>) -> Self {
        Self { shutdown, finished }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Waits until every worker has exited.
    pub async fn finished(self) -> Result<CrawlStats, DomainError> {
        self.finished
            .await
            .map_err(|e| DomainError::Fetch(format!("crawl task failed: {e}")))
    }
}

#[async_trait]
pub trait CrawlEngine: Send + Sync {
    /// Start crawling without blocking. Misconfiguration is reported here.
    async fn start(
        &self,
        config: &CrawlConfig,
        seeds: Vec<String>,
        factory: Arc<dyn VisitorFactory>,
    ) -> Result<CrawlRun, DomainError>;

    fn name(&self) -> &str;
}
