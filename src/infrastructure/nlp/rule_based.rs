//! Small in-process annotation pipeline.
//!
//! Good enough to drive lexicon scoring: regex tokenization, punctuation
//! sentence splits, dictionary lemmas with conservative plural stripping, a
//! handful of POS classes and ticker-shaped entities (`$ACME`, `ACME`).
//! Dependency and coreference stages are accepted but produce nothing.

use crate::domain::error::DomainError;
use crate::domain::ports::annotation::{
    AnnotatedDocument, AnnotationPipeline, AnnotationStage, Sentence, Token,
};
use regex::Regex;
use std::collections::HashSet;

const TICKER_TAG: &str = "TICKER";
const NUMBER_TAG: &str = "NUMBER";
const PERCENT_TAG: &str = "PERCENT";
const OUTSIDE_TAG: &str = "O";

/// All-caps words that look like tickers but almost never are.
const NOT_TICKERS: &[&str] = &[
    "AI", "CEO", "CFO", "COO", "CTO", "ETF", "EU", "GDP", "IPO", "SEC", "UK", "US", "USA", "USD",
    "EUR", "GBP", "THE", "AND", "FOR", "BUT", "NOT", "NEW", "FED", "IMF", "LLC", "INC", "LTD",
    "PLC", "NYSE", "FTSE", "OK", "TV", "AM", "PM", "EPS", "YOY", "QOQ",
];

/// Length range of a bare all-caps ticker. Single capitals ("I", "A") are words;
/// one-letter symbols need the `$` prefix.
const BARE_TICKER_LEN: std::ops::RangeInclusive<usize> = 2..=5;

const IRREGULAR: &[(&str, &str)] = &[
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    ("rose", "rise"),
    ("risen", "rise"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
];

const DETERMINERS: &[&str] = &["the", "a", "an", "this", "that", "these", "those"];
const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet"];
const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "for", "with", "to", "from", "by", "about", "into", "over", "after",
];
const PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they", "him", "her", "them"];

pub struct RuleBasedPipeline {
    token_re: Regex,
    not_tickers: HashSet<&'static str>,
}

impl RuleBasedPipeline {
    pub fn new() -> Self {
        let token_re = Regex::new(
            r"\$[A-Za-z]{1,5}\b|[A-Za-z]+(?:['\-][A-Za-z]+)*|\d+(?:[.,]\d+)*%?|[^\s\w]",
        )
        .expect("token pattern is a valid regex");
        Self {
            token_re,
            not_tickers: NOT_TICKERS.iter().copied().collect(),
        }
    }

    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.token_re.find_iter(text).map(|m| m.as_str()).collect()
    }

    fn split_sentences<'t>(tokens: Vec<&'t str>, split: bool) -> Vec<Vec<&'t str>> {
        if !split {
            return vec![tokens];
        }
        let mut sentences = Vec::new();
        let mut current = Vec::new();
        for tok in tokens {
            current.push(tok);
            if matches!(tok, "." | "!" | "?") {
                sentences.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            sentences.push(current);
        }
        sentences
    }

    /// Ticker symbol the token stands for, if it looks like one.
    fn ticker(&self, word: &str) -> Option<String> {
        if let Some(sym) = word.strip_prefix('$') {
            return Some(sym.to_uppercase());
        }
        let len = word.chars().count();
        let all_caps = word.chars().all(|c| c.is_ascii_uppercase());
        if all_caps && BARE_TICKER_LEN.contains(&len) && !self.not_tickers.contains(word) {
            return Some(word.to_string());
        }
        None
    }

    fn entity(&self, word: &str) -> (String, String) {
        if let Some(sym) = self.ticker(word) {
            return (TICKER_TAG.into(), sym);
        }
        let first = word.chars().next().unwrap_or_default();
        if first.is_ascii_digit() {
            if let Some(number) = word.strip_suffix('%') {
                return (PERCENT_TAG.into(), format!("{}%", number.replace(',', "")));
            }
            return (NUMBER_TAG.into(), word.replace(',', ""));
        }
        (OUTSIDE_TAG.into(), String::new())
    }

    fn part_of_speech(&self, word: &str, lemma: &str, sentence_start: bool) -> String {
        let first = word.chars().next().unwrap_or_default();
        if !first.is_alphanumeric() && first != '$' {
            return word.to_string();
        }
        if first.is_ascii_digit() {
            return "CD".into();
        }
        if self.ticker(word).is_some() {
            return "NNP".into();
        }
        let lower = word.to_lowercase();
        let tag = if lemma == "be" || lemma == "have" || lemma == "do" {
            "VB"
        } else if DETERMINERS.contains(&lower.as_str()) {
            "DT"
        } else if CONJUNCTIONS.contains(&lower.as_str()) {
            "CC"
        } else if PREPOSITIONS.contains(&lower.as_str()) {
            "IN"
        } else if PRONOUNS.contains(&lower.as_str()) {
            "PRP"
        } else if lower == "not" || lower.ends_with("ly") {
            "RB"
        } else if first.is_uppercase() && !sentence_start {
            "NNP"
        } else if lemma != lower {
            "NNS"
        } else {
            "NN"
        };
        tag.into()
    }

    fn parse_tree(tokens: &[Token]) -> String {
        let leaves: Vec<String> = tokens
            .iter()
            .map(|t| format!("({} {})", t.part_of_speech, t.text))
            .collect();
        format!("(ROOT (S {}))", leaves.join(" "))
    }
}

impl Default for RuleBasedPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Dictionary lemma with conservative plural stripping.
pub fn lemmatize(word: &str) -> String {
    let lower = word.trim_start_matches('$').to_lowercase();
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(w, _)| *w == lower) {
        return lemma.to_string();
    }
    if lower.chars().count() <= 4 || !lower.chars().all(char::is_alphabetic) {
        return lower;
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "shes", "ches", "xes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if lower.ends_with('s') && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        return lower[..lower.len() - 1].to_string();
    }
    lower
}

impl AnnotationPipeline for RuleBasedPipeline {
    fn annotate(&self, text: &str, stages: &[AnnotationStage]) -> Result<AnnotatedDocument, DomainError> {
        if !stages.contains(&AnnotationStage::Tokenize) {
            return Err(DomainError::Annotation(
                "every stage depends on tokenize".into(),
            ));
        }
        let wants = |stage: AnnotationStage| stages.contains(&stage);

        let sentences = Self::split_sentences(self.tokenize(text), wants(AnnotationStage::SentenceSplit))
            .into_iter()
            .map(|words| {
                let tokens: Vec<Token> = words
                    .iter()
                    .enumerate()
                    .map(|(i, word)| {
                        let lemma = lemmatize(word);
                        let mut token = Token {
                            text: word.to_string(),
                            ..Default::default()
                        };
                        if wants(AnnotationStage::PartOfSpeech) {
                            token.part_of_speech = self.part_of_speech(word, &lemma, i == 0);
                        }
                        if wants(AnnotationStage::Lemma) {
                            token.lemma = lemma;
                        }
                        if wants(AnnotationStage::NamedEntity) {
                            let (tag, normalized) = self.entity(word);
                            token.named_entity_tag = tag;
                            token.normalized_named_entity_tag = normalized;
                        }
                        token
                    })
                    .collect();
                let parse_tree = wants(AnnotationStage::Parse).then(|| Self::parse_tree(&tokens));
                Sentence {
                    tokens,
                    parse_tree,
                    dependencies: None,
                }
            })
            .collect();

        Ok(AnnotatedDocument {
            sentences,
            coreference: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate(text: &str) -> AnnotatedDocument {
        RuleBasedPipeline::new()
            .annotate(text, &AnnotationStage::SENTIMENT)
            .unwrap()
    }

    #[test]
    fn test_lemmas_of_simple_sentence() {
        let doc = annotate("This is good and not bad");
        let lemmas: Vec<_> = doc.tokens().map(|t| t.lemma.as_str()).collect();
        assert_eq!(lemmas, vec!["this", "be", "good", "and", "not", "bad"]);
    }

    #[test]
    fn test_plural_stripping() {
        assert_eq!(lemmatize("gains"), "gain");
        assert_eq!(lemmatize("losses"), "loss");
        assert_eq!(lemmatize("rallies"), "rally");
        assert_eq!(lemmatize("business"), "business");
        assert_eq!(lemmatize("famous"), "famous");
        assert_eq!(lemmatize("news"), "news");
        assert_eq!(lemmatize("Worse"), "bad");
    }

    #[test]
    fn test_sentence_split() {
        let doc = annotate("Shares rose. Analysts cheered! Why?");
        assert_eq!(doc.sentences.len(), 3);
        assert_eq!(doc.sentences[0].tokens.last().unwrap().text, ".");
    }

    #[test]
    fn test_ticker_entities() {
        let doc = annotate("Buy $acme and GBX, not the CEO pick or 1,200 shares at 5%");
        let entities: Vec<(&str, &str)> = doc
            .tokens()
            .filter(|t| !t.normalized_named_entity_tag.is_empty())
            .map(|t| (t.named_entity_tag.as_str(), t.normalized_named_entity_tag.as_str()))
            .collect();
        assert_eq!(
            entities,
            vec![
                ("TICKER", "ACME"),
                ("TICKER", "GBX"),
                ("NUMBER", "1200"),
                ("PERCENT", "5%"),
            ]
        );
    }

    #[test]
    fn test_bare_tickers_need_two_letters() {
        let doc = annotate("I think A beat GE and ACME but not SHOUTING, so buy $F");
        let tickers: Vec<&str> = doc
            .tokens()
            .filter(|t| t.named_entity_tag == TICKER_TAG)
            .map(|t| t.normalized_named_entity_tag.as_str())
            .collect();
        assert_eq!(tickers, vec!["GE", "ACME", "F"]);
    }

    #[test]
    fn test_stages_gate_fields() {
        let pipeline = RuleBasedPipeline::new();
        let doc = pipeline
            .annotate("ACME gains", &[AnnotationStage::Tokenize])
            .unwrap();
        let token = doc.tokens().next().unwrap();
        assert_eq!(token.text, "ACME");
        assert!(token.lemma.is_empty());
        assert!(token.normalized_named_entity_tag.is_empty());
        assert!(pipeline.annotate("x", &[AnnotationStage::Lemma]).is_err());
    }

    #[test]
    fn test_parse_stage_builds_flat_tree() {
        let doc = RuleBasedPipeline::new()
            .annotate("Acme is strong.", &AnnotationStage::ALL)
            .unwrap();
        assert_eq!(
            doc.sentences[0].parse_tree.as_deref(),
            Some("(ROOT (S (NN Acme) (VB is) (NN strong) (. .)))")
        );
    }
}
