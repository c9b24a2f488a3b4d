use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces out fetches to the same host.
///
/// Each call reserves the next free slot for the host, so workers hitting the
/// same host queue up behind each other instead of all firing after one delay.
#[derive(Debug)]
pub struct Politeness {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

impl Politeness {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// How long the caller must wait before fetching `url`.
    pub fn reserve(&self, url: &str) -> Duration {
        if self.delay.is_zero() {
            return Duration::ZERO;
        }
        let now = Instant::now();
        let mut slots = match self.next_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = slots.entry(host_of(url)).or_insert(now);
        let start = (*slot).max(now);
        *slot = start + self.delay;
        start - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_same_host_is_spaced() {
        let p = Politeness::new(Duration::from_millis(1000));
        assert_eq!(p.reserve("https://a.example/1"), Duration::ZERO);
        assert_eq!(p.reserve("https://a.example/2"), Duration::from_millis(1000));
        assert_eq!(p.reserve("https://A.example/3"), Duration::from_millis(2000));
        assert_eq!(p.reserve("https://b.example/1"), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_frees_up_over_time() {
        let p = Politeness::new(Duration::from_millis(500));
        p.reserve("https://a.example/");
        tokio::time::advance(Duration::from_millis(800)).await;
        assert_eq!(p.reserve("https://a.example/next"), Duration::ZERO);
    }

    #[test]
    fn test_zero_delay() {
        let p = Politeness::new(Duration::ZERO);
        assert_eq!(p.reserve("https://a.example/"), Duration::ZERO);
        assert_eq!(p.reserve("https://a.example/"), Duration::ZERO);
    }
}
