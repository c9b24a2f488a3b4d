use crate::application::aggregator::ResultAggregator;
use crate::application::sentiment::SentimentExtractor;
use crate::domain::entities::observation::Observation;
use crate::domain::entities::stock_registry::StockRegistry;
use crate::domain::ports::crawl_engine::{Page, PageVisitor, VisitorFactory};
use crate::domain::services::entity_matcher::EntityMatcher;
use crate::domain::services::frontier_policy::FrontierPolicy;
use crate::domain::values::lexicon::LexiconRegistry;
use std::sync::Arc;

/// Read-only state every worker of a crawl shares.
///
/// The matcher is always derived from `stocks`; build both together through
/// [`CrawlContext::new`].
pub struct CrawlContext {
    stocks: Arc<StockRegistry>,
    lexicon: Arc<LexiconRegistry>,
    matcher: Arc<EntityMatcher>,
    extractor: Arc<SentimentExtractor>,
}

impl CrawlContext {
    pub fn new(
        stocks: Arc<StockRegistry>,
        lexicon: Arc<LexiconRegistry>,
        extractor: Arc<SentimentExtractor>,
    ) -> Self {
        let matcher = Arc::new(EntityMatcher::from_registry(&stocks));
        Self {
            stocks,
            lexicon,
            matcher,
            extractor,
        }
    }

    /// Same lexicon and extractor over a new registry snapshot.
    pub fn with_stocks(&self, stocks: Arc<StockRegistry>) -> Self {
        Self::new(stocks, self.lexicon.clone(), self.extractor.clone())
    }

    pub fn stocks(&self) -> &StockRegistry {
        &self.stocks
    }

    pub fn lexicon(&self) -> &LexiconRegistry {
        &self.lexicon
    }

    pub fn matcher(&self) -> &Arc<EntityMatcher> {
        &self.matcher
    }

    pub fn extractor(&self) -> &SentimentExtractor {
        &self.extractor
    }
}

/// Page logic for one worker: filters discovered links and turns relevant
/// pages into observations.
pub struct CrawlWorker {
    id: usize,
    policy: FrontierPolicy,
    context: Arc<CrawlContext>,
    aggregator: Arc<ResultAggregator>,
    links_visited: u64,
    pages_scored: u64,
}

impl CrawlWorker {
    pub fn new(
        id: usize,
        context: Arc<CrawlContext>,
        aggregator: Arc<ResultAggregator>,
        expansion_threshold: u64,
    ) -> Self {
        let policy = FrontierPolicy::new(context.matcher.clone(), expansion_threshold);
        Self {
            id,
            policy,
            context,
            aggregator,
            links_visited: 0,
            pages_scored: 0,
        }
    }

    pub fn links_visited(&self) -> u64 {
        self.links_visited
    }

    pub fn pages_scored(&self) -> u64 {
        self.pages_scored
    }
}

impl PageVisitor for CrawlWorker {
    fn should_visit(&mut self, referring_page: &Page, url: &str) -> bool {
        self.policy
            .should_visit(referring_page.text.as_deref(), self.links_visited, url)
    }

    fn visit(&mut self, page: &Page) {
        self.links_visited += 1;
        tracing::debug!(
            worker = self.id,
            links_visited = self.links_visited,
            url = %page.url,
            outgoing = page.outgoing_links.len(),
            "visiting page"
        );

        let Some(text) = page.text.as_deref() else {
            return;
        };
        let title = page.title.as_deref().unwrap_or_default();
        let Some(company) = self.context.matcher.first_match(title) else {
            return;
        };

        match self
            .context
            .extractor
            .analyse(text, &self.context.stocks, &self.context.lexicon)
        {
            Some((stock, scale)) => {
                tracing::info!(
                    worker = self.id,
                    company,
                    symbol = stock.symbol().unwrap_or_default(),
                    score = scale.score(),
                    url = %page.url,
                    "recorded observation"
                );
                if self
                    .aggregator
                    .record(Observation::new(stock, scale.score(), page.url.clone()))
                {
                    self.pages_scored += 1;
                }
            }
            None => {
                tracing::debug!(worker = self.id, company, url = %page.url, "no scored entity on page");
            }
        }
    }

    fn on_before_exit(&mut self) {
        tracing::info!(
            worker = self.id,
            links_visited = self.links_visited,
            pages_scored = self.pages_scored,
            "worker finished"
        );
    }
}

/// Creates one [`CrawlWorker`] per engine thread, all feeding the same
/// aggregator.
pub struct CrawlWorkerFactory {
    context: Arc<CrawlContext>,
    aggregator: Arc<ResultAggregator>,
    expansion_threshold: u64,
}

impl CrawlWorkerFactory {
    pub fn new(
        context: Arc<CrawlContext>,
        aggregator: Arc<ResultAggregator>,
        expansion_threshold: u64,
    ) -> Self {
        Self {
            context,
            aggregator,
            expansion_threshold,
        }
    }
}

impl VisitorFactory for CrawlWorkerFactory {
    fn new_visitor(&self, worker_id: usize) -> Box<dyn PageVisitor> {
        Box::new(CrawlWorker::new(
            worker_id,
            self.context.clone(),
            self.aggregator.clone(),
            self.expansion_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::stock::Stock;
    use crate::infrastructure::nlp::rule_based::RuleBasedPipeline;

    fn context() -> Arc<CrawlContext> {
        let stocks = Arc::new(StockRegistry::new(vec![Stock::new("Acme Corp", "ACME", "NYSE")]));
        let lexicon = Arc::new(LexiconRegistry::new(["strong", "growth"], ["weak", "lawsuit"]));
        let extractor = Arc::new(SentimentExtractor::new(Arc::new(RuleBasedPipeline::new())));
        Arc::new(CrawlContext::new(stocks, lexicon, extractor))
    }

    fn page(title: &str, text: &str) -> Page {
        Page {
            url: "https://news.example/acme".into(),
            title: Some(title.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_gate() {
        let agg = Arc::new(ResultAggregator::new());
        let mut worker = CrawlWorker::new(0, context(), agg.clone(), 1);
        worker.visit(&page("Markets today", "ACME posts strong growth"));
        assert!(agg.snapshot().is_empty());
        assert_eq!(worker.links_visited(), 1);
    }

    #[test]
    fn test_records_scored_page() {
        let agg = Arc::new(ResultAggregator::new());
        let mut worker = CrawlWorker::new(0, context(), agg.clone(), 1);
        worker.visit(&page("Acme Corp earnings", "ACME posts strong growth."));
        assert_eq!(agg.snapshot().scores("ACME"), Some(&[2][..]));
        assert_eq!(worker.pages_scored(), 1);
    }

    #[test]
    fn test_non_html_page_counted_but_not_scored() {
        let agg = Arc::new(ResultAggregator::new());
        let mut worker = CrawlWorker::new(0, context(), agg.clone(), 1);
        let mut p = page("Acme Corp", "");
        p.text = None;
        worker.visit(&p);
        assert_eq!(worker.links_visited(), 1);
        assert!(agg.snapshot().is_empty());
    }

    #[test]
    fn test_should_visit_uses_visit_count() {
        let agg = Arc::new(ResultAggregator::new());
        let mut worker = CrawlWorker::new(0, context(), agg, 1);
        let referring = page("Acme Corp", "Acme Corp news roundup");
        let url = "https://news.example/next";
        assert!(!worker.should_visit(&referring, url));
        worker.visit(&page("Unrelated", "nothing"));
        assert!(worker.should_visit(&referring, url));
        assert!(!worker.should_visit(&referring, "https://news.example/logo.png"));
    }
}
