//! Lexicon sentiment for one document, attributed to the first tracked
//! ticker the annotation pipeline recognises in it.

use crate::domain::entities::stock::Stock;
use crate::domain::entities::stock_registry::StockRegistry;
use crate::domain::ports::annotation::{AnnotationPipeline, AnnotationStage};
use crate::domain::values::lexicon::{LexiconRegistry, Polarity};
use crate::domain::values::polarity::PolarityScale;
use std::sync::Arc;

/// Documents longer than this many characters are never annotated.
pub const MAX_TEXT_CHARS: usize = 300_000;

pub struct SentimentExtractor {
    pipeline: Arc<dyn AnnotationPipeline>,
    scale: PolarityScale,
}

fn exceeds_limit(text: &str) -> bool {
    // Byte length bounds char count from above.
    text.len() > MAX_TEXT_CHARS && text.chars().count() > MAX_TEXT_CHARS
}

impl SentimentExtractor {
    pub fn new(pipeline: Arc<dyn AnnotationPipeline>) -> Self {
        Self::with_scale(pipeline, PolarityScale::unbounded())
    }

    /// `scale` is a template; every call starts from a zeroed copy of it.
    pub fn with_scale(pipeline: Arc<dyn AnnotationPipeline>, scale: PolarityScale) -> Self {
        Self {
            pipeline,
            scale: scale.fresh(),
        }
    }

    /// Score `text` and attribute it to a tracked stock.
    ///
    /// Returns `None` without calling the pipeline when the text is empty,
    /// longer than [`MAX_TEXT_CHARS`], or no stock could possibly match.
    /// Also `None` when no token's normalized entity equals a tracked symbol,
    /// however polar the text is.
    pub fn analyse(
        &self,
        text: &str,
        stocks: &StockRegistry,
        lexicon: &LexiconRegistry,
    ) -> Option<(Stock, PolarityScale)> {
        if text.is_empty() || stocks.is_empty() || exceeds_limit(text) {
            return None;
        }

        let document = match self.pipeline.annotate(text, &AnnotationStage::SENTIMENT) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(pipeline = self.pipeline.name(), error = %e, "annotation failed");
                return None;
            }
        };

        let mut scale = self.scale.fresh();
        let mut matched: Option<&Stock> = None;

        for token in document.tokens() {
            match lexicon.polarity(&token.lemma) {
                Polarity::Positive => scale.positive(),
                Polarity::Negative => scale.negative(),
                Polarity::Neutral => {}
            }

            if matched.is_none() && !token.normalized_named_entity_tag.is_empty() {
                matched = stocks.get(&token.normalized_named_entity_tag);
            }
        }

        let stock = matched?;
        tracing::debug!(
            symbol = stock.symbol().unwrap_or_default(),
            score = scale.score(),
            positives = scale.positives(),
            negatives = scale.negatives(),
            "document scored"
        );
        Some((stock.clone(), scale))
    }
}
