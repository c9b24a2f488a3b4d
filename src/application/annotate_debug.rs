//! Full-annotation dump for inspecting what the pipeline sees. Never scored.

use crate::application::sentiment::MAX_TEXT_CHARS;
use crate::domain::error::DomainError;
use crate::domain::ports::annotation::{AnnotatedDocument, AnnotationPipeline, AnnotationStage};
use std::fmt::Write;
use std::sync::Arc;

pub struct AnnotateDebugUseCase {
    pipeline: Arc<dyn AnnotationPipeline>,
}

impl AnnotateDebugUseCase {
    pub fn new(pipeline: Arc<dyn AnnotationPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn execute(&self, text: &str) -> Result<String, DomainError> {
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(DomainError::InvalidInput(format!(
                "text exceeds {MAX_TEXT_CHARS} characters"
            )));
        }
        let doc = self.pipeline.annotate(text, &AnnotationStage::ALL)?;
        Ok(render(&doc))
    }
}

fn render(doc: &AnnotatedDocument) -> String {
    let mut out = String::new();
    for (i, sentence) in doc.sentences.iter().enumerate() {
        let _ = writeln!(out, "sentence {}:", i + 1);
        for token in &sentence.tokens {
            let _ = writeln!(
                out,
                "  word: {} POS: {} NER: {} normalized: {} lemma: {}",
                token.text,
                token.part_of_speech,
                token.named_entity_tag,
                token.normalized_named_entity_tag,
                token.lemma
            );
        }
        if let Some(tree) = &sentence.parse_tree {
            let _ = writeln!(out, "  parse: {tree}");
        }
        if let Some(deps) = &sentence.dependencies {
            let _ = writeln!(out, "  dependencies: {deps}");
        }
    }
    for (i, chain) in doc.coreference.iter().enumerate() {
        let _ = writeln!(out, "coref {}: {}", i + 1, chain.mentions.join(" -> "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::nlp::rule_based::RuleBasedPipeline;

    #[test]
    fn test_dump_lists_every_token() {
        let uc = AnnotateDebugUseCase::new(Arc::new(RuleBasedPipeline::new()));
        let dump = uc
            .execute("Frankie kicks the ball into the goal. ACME scores!")
            .unwrap();
        assert!(dump.contains("sentence 1:"));
        assert!(dump.contains("sentence 2:"));
        assert!(dump.contains("word: kicks POS: NNS NER: O normalized:  lemma: kick"));
        assert!(dump.contains("word: ACME POS: NNP NER: TICKER normalized: ACME"));
        assert!(dump.contains("parse: (ROOT (S"));
    }

    #[test]
    fn test_oversized_text_rejected() {
        let uc = AnnotateDebugUseCase::new(Arc::new(RuleBasedPipeline::new()));
        let text = "x".repeat(MAX_TEXT_CHARS + 1);
        assert!(matches!(uc.execute(&text), Err(DomainError::InvalidInput(_))));
    }
}
