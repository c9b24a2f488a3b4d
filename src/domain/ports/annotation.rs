//! Annotation pipeline port.
//!
//! The crawler never tokenizes or tags text itself. It submits a document
//! together with the stages it needs and reads the per-token output back.

use crate::domain::error::DomainError;
use serde::Serialize;
use std::fmt;

/// Processing stages a pipeline can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStage {
    Tokenize,
    SentenceSplit,
    PartOfSpeech,
    Lemma,
    NamedEntity,
    Parse,
    Coreference,
}

impl AnnotationStage {
    /// Stages the sentiment path depends on.
    pub const SENTIMENT: [AnnotationStage; 5] = [
        AnnotationStage::Tokenize,
        AnnotationStage::SentenceSplit,
        AnnotationStage::PartOfSpeech,
        AnnotationStage::Lemma,
        AnnotationStage::NamedEntity,
    ];

    /// Everything, for the debug dump.
    pub const ALL: [AnnotationStage; 7] = [
        AnnotationStage::Tokenize,
        AnnotationStage::SentenceSplit,
        AnnotationStage::PartOfSpeech,
        AnnotationStage::Lemma,
        AnnotationStage::NamedEntity,
        AnnotationStage::Parse,
        AnnotationStage::Coreference,
    ];
}

impl fmt::Display for AnnotationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationStage::Tokenize => "tokenize",
            AnnotationStage::SentenceSplit => "ssplit",
            AnnotationStage::PartOfSpeech => "pos",
            AnnotationStage::Lemma => "lemma",
            AnnotationStage::NamedEntity => "ner",
            AnnotationStage::Parse => "parse",
            AnnotationStage::Coreference => "coref",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub part_of_speech: String,
    pub named_entity_tag: String,
    /// Canonical form of the entity span, empty when the token is not one.
    pub normalized_named_entity_tag: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub parse_tree: Option<String>,
    pub dependencies: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorefChain {
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotatedDocument {
    pub sentences: Vec<Sentence>,
    pub coreference: Vec<CorefChain>,
}

impl AnnotatedDocument {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}

pub trait AnnotationPipeline: Send + Sync {
    fn annotate(&self, text: &str, stages: &[AnnotationStage]) -> Result<AnnotatedDocument, DomainError>;

    /// Pipeline name for logging
    fn name(&self) -> &str;
}
