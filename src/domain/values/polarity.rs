use serde::Serialize;

/// Running sentiment tally for a single document.
///
/// `positive()` adds one and `negative()` subtracts one. When bounds are set
/// the tally is clamped after every step, so a long run of one polarity
/// cannot push the score past the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolarityScale {
    score: i64,
    positives: u32,
    negatives: u32,
    bounds: Option<(i64, i64)>,
}

impl PolarityScale {
    pub fn unbounded() -> Self {
        Self {
            score: 0,
            positives: 0,
            negatives: 0,
            bounds: None,
        }
    }

    pub fn bounded(min: i64, max: i64) -> Result<Self, String> {
        if min > 0 || max < 0 || min > max {
            return Err(format!("Polarity bounds must satisfy min <= 0 <= max, got [{min}, {max}]"));
        }
        Ok(Self {
            bounds: Some((min, max)),
            ..Self::unbounded()
        })
    }

    /// A zeroed scale with the same bounds. Every extraction starts from one.
    pub fn fresh(&self) -> Self {
        Self {
            bounds: self.bounds,
            ..Self::unbounded()
        }
    }

    pub fn positive(&mut self) {
        self.positives += 1;
        self.step(1);
    }

    pub fn negative(&mut self) {
        self.negatives += 1;
        self.step(-1);
    }

    fn step(&mut self, delta: i64) {
        let next = self.score + delta;
        self.score = match self.bounds {
            Some((min, max)) => next.clamp(min, max),
            None => next,
        };
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn positives(&self) -> u32 {
        self.positives
    }

    pub fn negatives(&self) -> u32 {
        self.negatives
    }
}

impl Default for PolarityScale {
    fn default() -> Self {
        Self::unbounded()
    }
}
