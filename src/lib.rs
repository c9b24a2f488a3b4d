pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::annotate_debug::AnnotateDebugUseCase;
use crate::application::crawl_worker::CrawlContext;
use crate::application::orchestrator::{CrawlCompletion, CrawlOrchestrator, CrawlReport};
use crate::application::sentiment::SentimentExtractor;
use crate::domain::entities::stock::Stock;
use crate::domain::entities::stock_registry::StockRegistry;
use crate::domain::error::DomainError;
use crate::domain::ports::annotation::AnnotationPipeline;
use crate::domain::ports::crawl_engine::CrawlEngine;
use crate::domain::values::crawl_config::CrawlConfig;
use crate::domain::values::lexicon::LexiconRegistry;
use crate::domain::values::polarity::PolarityScale;
use crate::domain::values::seed_url::SeedUrl;
use crate::infrastructure::crawler::engine::FrontierCrawlEngine;
use crate::infrastructure::files::lexicon::load_lexicon;
use crate::infrastructure::files::seeds::load_seeds;
use crate::infrastructure::files::stocks::load_stocks;
use crate::infrastructure::nlp::rule_based::RuleBasedPipeline;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Locations of the resource files, overridable through `STOCKSENSE_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct ResourcePaths {
    pub stocks: PathBuf,
    pub positive: PathBuf,
    pub negative: PathBuf,
    pub seeds: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            stocks: PathBuf::from("./resources/stocks.json"),
            positive: PathBuf::from("./resources/positive-set.txt"),
            negative: PathBuf::from("./resources/negative-set.txt"),
            seeds: PathBuf::from("./resources/seeds.json"),
        }
    }
}

impl ResourcePaths {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, fallback: PathBuf| std::env::var(name).map(PathBuf::from).unwrap_or(fallback);
        Self {
            stocks: var("STOCKSENSE_STOCKS", defaults.stocks),
            positive: var("STOCKSENSE_POSITIVE", defaults.positive),
            negative: var("STOCKSENSE_NEGATIVE", defaults.negative),
            seeds: var("STOCKSENSE_SEEDS", defaults.seeds),
        }
    }
}

pub struct StockSense {
    orchestrator: CrawlOrchestrator,
    annotate_uc: AnnotateDebugUseCase,
}

impl StockSense {
    /// HTTP crawling and rule-based annotation over the given resources.
    pub fn new(paths: &ResourcePaths, config: CrawlConfig) -> Self {
        let stocks = load_stocks(&paths.stocks);
        let lexicon = load_lexicon(&paths.positive, &paths.negative);
        let seeds = load_seeds(&paths.seeds);

        Self::with_components(
            stocks,
            lexicon,
            seeds,
            Arc::new(FrontierCrawlEngine::http()),
            Arc::new(RuleBasedPipeline::new()),
            config,
        )
    }

    pub fn with_components(
        stocks: StockRegistry,
        lexicon: LexiconRegistry,
        seeds: Vec<SeedUrl>,
        engine: Arc<dyn CrawlEngine>,
        pipeline: Arc<dyn AnnotationPipeline>,
        config: CrawlConfig,
    ) -> Self {
        let extractor = Arc::new(SentimentExtractor::new(pipeline.clone()));
        let context = CrawlContext::new(Arc::new(stocks), Arc::new(lexicon), extractor);
        let orchestrator = CrawlOrchestrator::new(engine, context, config);
        for seed in seeds {
            orchestrator.add_seed(seed);
        }

        Self {
            orchestrator,
            annotate_uc: AnnotateDebugUseCase::new(pipeline),
        }
    }

    pub fn orchestrator(&self) -> &CrawlOrchestrator {
        &self.orchestrator
    }

    pub fn set_test_mode(&self, variant: Option<String>) {
        self.orchestrator.set_test_mode(variant);
    }

    pub fn add_seed(&self, seed: SeedUrl) -> bool {
        self.orchestrator.add_seed(seed)
    }

    pub fn set_stocks(&self, stocks: StockRegistry) -> Result<(), DomainError> {
        self.orchestrator.rebuild_matcher(Arc::new(stocks))
    }

    pub async fn start_crawl(&self) -> Result<Option<CrawlCompletion>, DomainError> {
        self.orchestrator.start().await
    }

    pub async fn stop_crawl(&self) -> Result<(), DomainError> {
        self.orchestrator.stop().await
    }

    /// Run one crawl to completion, or until `stop` resolves, and return
    /// its report.
    pub async fn crawl_until<F>(&self, stop: F) -> Result<CrawlReport, DomainError>
    where
        F: Future<Output = ()>,
    {
        let completion = self
            .orchestrator
            .start()
            .await?
            .ok_or_else(|| DomainError::InvalidInput("a crawl is already running".into()))?;

        let wait = completion.wait();
        tokio::pin!(wait);
        tokio::pin!(stop);

        let report = tokio::select! {
            report = &mut wait => report,
            _ = &mut stop => {
                self.orchestrator.stop().await?;
                wait.await
            }
        };
        report.ok_or_else(|| DomainError::Fetch("crawl ended without a result".into()))
    }

    /// Score one document against the loaded stocks and lexicon.
    pub fn analyse(&self, text: &str) -> Option<(Stock, PolarityScale)> {
        let context = self.orchestrator.context();
        context
            .extractor()
            .analyse(text, context.stocks(), context.lexicon())
    }

    pub fn annotate(&self, text: &str) -> Result<String, DomainError> {
        self.annotate_uc.execute(text)
    }

    /// First tracked company name found in `text`.
    pub fn match_company(&self, text: &str) -> Option<String> {
        self.orchestrator
            .context()
            .matcher()
            .first_match(text)
            .map(str::to_string)
    }
}
