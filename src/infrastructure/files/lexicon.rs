use super::read_resource;
use crate::domain::values::lexicon::{canonical_word, LexiconRegistry};
use std::path::Path;

/// One word per line, trimmed and lowercased. Blank lines are skipped.
pub fn load_word_list(path: &Path) -> Vec<String> {
    let Some(contents) = read_resource(path, "lexicon") else {
        return Vec::new();
    };
    contents
        .lines()
        .map(canonical_word)
        .filter(|w| !w.is_empty())
        .collect()
}

pub fn load_lexicon(positive: &Path, negative: &Path) -> LexiconRegistry {
    let lexicon = LexiconRegistry::new(load_word_list(positive), load_word_list(negative));
    let conflicts = lexicon.conflicts();
    if !conflicts.is_empty() {
        tracing::warn!(words = ?conflicts, "words listed as both positive and negative count as positive");
    }
    tracing::info!(
        positive = lexicon.positive().len(),
        negative = lexicon.negative().len(),
        "lexicon loaded"
    );
    lexicon
}
