use std::collections::HashSet;

/// Word polarity according to the lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Positive and negative word sets, lowercase and trimmed.
///
/// Built once at startup and shared read-only. A word present in both sets is
/// a lexicon error; lookups report it as positive.
#[derive(Debug, Clone, Default)]
pub struct LexiconRegistry {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

/// Canonical lexicon form of a word: trimmed and lowercased.
pub fn canonical_word(word: &str) -> String {
    word.trim().to_lowercase()
}

fn canonical_set<I, S>(words: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| canonical_word(w.as_ref()))
        .filter(|w| !w.is_empty())
        .collect()
}

impl LexiconRegistry {
    pub fn new<P, N, S, T>(positive: P, negative: N) -> Self
    where
        P: IntoIterator<Item = S>,
        N: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            positive: canonical_set(positive),
            negative: canonical_set(negative),
        }
    }

    pub fn polarity(&self, lemma: &str) -> Polarity {
        let word = canonical_word(lemma);
        if self.positive.contains(&word) {
            Polarity::Positive
        } else if self.negative.contains(&word) {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    pub fn positive(&self) -> &HashSet<String> {
        &self.positive
    }

    pub fn negative(&self) -> &HashSet<String> {
        &self.negative
    }

    /// Words listed as both positive and negative.
    pub fn conflicts(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self
            .positive
            .intersection(&self.negative)
            .map(String::as_str)
            .collect();
        words.sort_unstable();
        words
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}
