//! Crawl lifecycle: configuration, seeds, start/stop and delivery of the
//! aggregated result.
//!
//! ```text
//! Idle --start--> Running --stop--> Draining --workers done--> Idle
//!                    \-------------frontier exhausted-------------^
//! ```
//!
//! Each crawl gets a fresh [`ResultAggregator`] shared by all its workers.
//! The frozen aggregate is delivered exactly once through the
//! [`CrawlCompletion`] returned by [`CrawlOrchestrator::start`], before the
//! orchestrator reports `Idle` again.

use crate::application::aggregator::ResultAggregator;
use crate::application::crawl_worker::{CrawlContext, CrawlWorkerFactory};
use crate::domain::entities::stock_registry::StockRegistry;
use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::{CrawlEngine, CrawlStats, ShutdownHandle};
use crate::domain::values::aggregate::AggregateResult;
use crate::domain::values::crawl_config::CrawlConfig;
use crate::domain::values::seed_url::{SeedKind, SeedUrl};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{oneshot, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlPhase {
    Idle,
    Running,
    Draining,
}

/// What a finished crawl hands back.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub result: AggregateResult,
    /// Absent when the engine task itself failed.
    pub stats: Option<CrawlStats>,
}

/// One-shot handle on the outcome of a started crawl.
pub struct CrawlCompletion {
    rx: oneshot::Receiver<CrawlReport>,
}

impl CrawlCompletion {
    /// Resolves once the crawl has shut down. `None` only if the runtime
    /// dropped the crawl task before it could report.
    pub async fn wait(self) -> Option<CrawlReport> {
        self.rx.await.ok()
    }
}

struct Settings {
    config: CrawlConfig,
    seeds: Vec<SeedUrl>,
    test_mode: Option<String>,
    context: Arc<CrawlContext>,
}

impl Settings {
    fn seeds_of(&self, kind: &SeedKind) -> Vec<String> {
        self.seeds
            .iter()
            .filter(|s| &s.kind == kind)
            .map(|s| s.url.clone())
            .collect()
    }

    /// Seeds of the requested test variant, falling back to the default set
    /// when no variant is requested or the variant has no seeds.
    fn select_seeds(&self) -> Result<Vec<String>, DomainError> {
        if let Some(variant) = &self.test_mode {
            let seeds = self.seeds_of(&SeedKind::Test(variant.to_lowercase()));
            if !seeds.is_empty() {
                tracing::info!(variant = %variant, count = seeds.len(), "using test seeds");
                return Ok(seeds);
            }
            tracing::warn!(variant = %variant, "test mode has no seeds, using default seeds");
        }
        let seeds = self.seeds_of(&SeedKind::Default);
        if seeds.is_empty() {
            return Err(DomainError::Config("no seed urls configured".into()));
        }
        Ok(seeds)
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct CrawlOrchestrator {
    engine: Arc<dyn CrawlEngine>,
    settings: Mutex<Settings>,
    phase: Arc<watch::Sender<CrawlPhase>>,
    shutdown: Arc<Mutex<Option<ShutdownHandle>>>,
}

impl CrawlOrchestrator {
    pub fn new(engine: Arc<dyn CrawlEngine>, context: CrawlContext, config: CrawlConfig) -> Self {
        let (phase, _) = watch::channel(CrawlPhase::Idle);
        Self {
            engine,
            settings: Mutex::new(Settings {
                config,
                seeds: Vec::new(),
                test_mode: None,
                context: Arc::new(context),
            }),
            phase: Arc::new(phase),
            shutdown: Arc::new(Mutex::new(None)),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        *self.phase.borrow()
    }

    pub fn is_crawling(&self) -> bool {
        self.phase() != CrawlPhase::Idle
    }

    pub fn config(&self) -> CrawlConfig {
        locked(&self.settings).config.clone()
    }

    /// Replace the configuration used by the next crawl.
    pub fn set_config(&self, config: CrawlConfig) -> Result<(), DomainError> {
        config.validate()?;
        locked(&self.settings).config = config;
        Ok(())
    }

    /// Returns `false` when the seed was already present.
    pub fn add_seed(&self, seed: SeedUrl) -> bool {
        let mut settings = locked(&self.settings);
        if seed.url.is_empty() || settings.seeds.contains(&seed) {
            return false;
        }
        settings.seeds.push(seed);
        true
    }

    /// Removes the URL under every seed kind. Returns whether anything was removed.
    pub fn remove_seed(&self, url: &str) -> bool {
        let mut settings = locked(&self.settings);
        let before = settings.seeds.len();
        settings.seeds.retain(|s| s.url != url.trim());
        settings.seeds.len() != before
    }

    pub fn seeds(&self) -> Vec<SeedUrl> {
        locked(&self.settings).seeds.clone()
    }

    pub fn set_test_mode(&self, variant: Option<String>) {
        locked(&self.settings).test_mode = variant.filter(|v| !v.trim().is_empty());
    }

    /// Swap in a new registry snapshot and the matcher derived from it.
    pub fn rebuild_matcher(&self, stocks: Arc<StockRegistry>) -> Result<(), DomainError> {
        if self.is_crawling() {
            return Err(DomainError::InvalidInput(
                "cannot replace the stock registry while crawling".into(),
            ));
        }
        let mut settings = locked(&self.settings);
        let context = settings.context.with_stocks(stocks);
        tracing::info!(patterns = context.matcher().pattern_count(), "entity matcher rebuilt");
        settings.context = Arc::new(context);
        Ok(())
    }

    pub fn context(&self) -> Arc<CrawlContext> {
        locked(&self.settings).context.clone()
    }

    /// Start a crawl without blocking.
    ///
    /// Returns `Ok(None)` when a crawl is already in progress. Configuration
    /// and engine errors are returned and leave the orchestrator idle.
    pub async fn start(&self) -> Result<Option<CrawlCompletion>, DomainError> {
        let claimed = self.phase.send_if_modified(|phase| {
            if *phase == CrawlPhase::Idle {
                *phase = CrawlPhase::Running;
                true
            } else {
                false
            }
        });
        if !claimed {
            tracing::debug!("start ignored, crawl already in progress");
            return Ok(None);
        }

        match self.launch().await {
            Ok(completion) => Ok(Some(completion)),
            Err(e) => {
                self.phase.send_replace(CrawlPhase::Idle);
                Err(e)
            }
        }
    }

    async fn launch(&self) -> Result<CrawlCompletion, DomainError> {
        let (config, seeds, context) = {
            let settings = locked(&self.settings);
            settings.config.validate()?;
            (settings.config.clone(), settings.select_seeds()?, settings.context.clone())
        };

        let aggregator = Arc::new(ResultAggregator::new());
        let factory = Arc::new(CrawlWorkerFactory::new(
            context,
            aggregator.clone(),
            config.expansion_threshold,
        ));

        tracing::info!(
            engine = self.engine.name(),
            workers = config.number_of_crawlers,
            seeds = seeds.len(),
            "starting crawl"
        );
        let run = self.engine.start(&config, seeds, factory).await?;

        let handle = run.shutdown_handle();
        *locked(&self.shutdown) = Some(handle.clone());
        // stop() may have run before the handle existed.
        if self.phase() == CrawlPhase::Draining {
            handle.shutdown();
        }

        let (tx, rx) = oneshot::channel();
        let phase = self.phase.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let stats = match run.finished().await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::error!(error = %e, "crawl ended abnormally");
                    None
                }
            };
            let report = CrawlReport {
                result: aggregator.snapshot(),
                stats,
            };
            tracing::info!(stocks = report.result.len(), "crawl finished");
            locked(&shutdown).take();
            if tx.send(report).is_err() {
                tracing::debug!("crawl result dropped, nobody waiting");
            }
            phase.send_replace(CrawlPhase::Idle);
        });

        Ok(CrawlCompletion { rx })
    }

    /// Ask the running crawl to stop and wait until every worker has
    /// finished its in-flight page and the result has been delivered.
    /// Does nothing when idle.
    pub async fn stop(&self) -> Result<(), DomainError> {
        let mut idle = self.phase.subscribe();
        let draining = self.phase.send_if_modified(|phase| {
            if *phase == CrawlPhase::Running {
                *phase = CrawlPhase::Draining;
                true
            } else {
                false
            }
        });
        if !draining && self.phase() == CrawlPhase::Idle {
            return Ok(());
        }

        tracing::info!("stopping crawl");
        if let Some(handle) = locked(&self.shutdown).as_ref() {
            handle.shutdown();
        }

        idle.wait_for(|phase| *phase == CrawlPhase::Idle)
            .await
            .map_err(|_| DomainError::Config("crawl state channel closed".into()))?;
        Ok(())
    }
}
