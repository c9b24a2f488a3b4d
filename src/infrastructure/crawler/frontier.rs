//! Shared work queue of the frontier engine.
//!
//! Tracks scheduled URLs, which ones were already seen and how many are being
//! fetched right now. The crawl is over when the queue is empty and no worker
//! is busy, since only a busy worker can still add links.

use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::ShutdownSignal;
use crate::infrastructure::sqlite::frontier_store::FrontierStore;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct State {
    queue: VecDeque<(String, u32)>,
    seen: HashSet<String>,
    in_flight: usize,
    handed_out: u64,
}

pub struct Frontier {
    state: Mutex<State>,
    changed: Notify,
    store: Option<FrontierStore>,
    /// Negative means unlimited.
    page_budget: i64,
}

impl Frontier {
    pub fn new(store: Option<FrontierStore>, page_budget: i64) -> Self {
        Self {
            state: Mutex::new(State::default()),
            changed: Notify::new(),
            store,
            page_budget,
        }
    }

    /// Reload pending work from the store. Returns how many URLs were queued.
    pub fn resume(&self) -> Result<usize, DomainError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let saved = store.load()?;
        let mut state = self.lock();
        state.seen.extend(saved.seen);
        let resumed = saved.pending.len();
        state.queue.extend(saved.pending);
        Ok(resumed)
    }

    pub fn clear_store(&self) -> Result<(), DomainError> {
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue URLs that were not seen before. Returns how many were new.
    pub fn schedule<I>(&self, urls: I, depth: u32) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        {
            let mut state = self.lock();
            for url in urls {
                if !state.seen.insert(url.clone()) {
                    continue;
                }
                if let Some(store) = &self.store {
                    if let Err(e) = store.insert_pending(&url, depth) {
                        tracing::warn!(url = %url, error = %e, "could not persist frontier url");
                    }
                }
                state.queue.push_back((url, depth));
                added += 1;
            }
        }
        if added > 0 {
            self.changed.notify_waiters();
        }
        added
    }

    /// Next URL to fetch, waiting while other workers may still add links.
    /// `None` once the crawl is exhausted, the page budget is spent or
    /// shutdown was requested.
    pub async fn next(&self, shutdown: &mut ShutdownSignal) -> Option<(String, u32)> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if shutdown.is_shutdown() {
                return None;
            }
            {
                let mut state = self.lock();
                if self.page_budget >= 0 && state.handed_out >= self.page_budget as u64 {
                    return None;
                }
                if let Some(item) = state.queue.pop_front() {
                    state.in_flight += 1;
                    state.handed_out += 1;
                    return Some(item);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = shutdown.requested() => return None,
            }
        }
    }

    /// Mark a handed-out URL as finished, fetched or not.
    pub fn complete(&self, url: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = store.mark_done(url) {
                tracing::warn!(url = %url, error = %e, "could not persist fetched url");
            }
        }
        self.release();
    }

    /// Give a handed-out URL up without fetching it. It stays pending in the
    /// store so a resumed crawl picks it up again.
    pub fn abandon(&self, url: &str) {
        tracing::debug!(url = %url, "leaving url pending");
        self.release();
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }
}
