use crate::request_slot::RequestSlot;
use popcorn_models::SearchOutcome;
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

/// Turns query edits into a single current [`SearchOutcome`].
///
/// Only the most recent query can publish a result. Each call to
/// [`SearchCoordinator::search`] cancels the previous request before anything
/// else happens, and a response is applied only while its request is still
/// current. Cancelled requests never surface as failures.
pub struct SearchCoordinator {
    source: Arc<dyn MovieSource>,
    min_query_length: usize,
    slot: Arc<RequestSlot>,
    outcome: Arc<watch::Sender<SearchOutcome>>,
}

impl SearchCoordinator {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self::with_min_query_length(source, DEFAULT_MIN_QUERY_LENGTH)
    }

    pub fn with_min_query_length(source: Arc<dyn MovieSource>, min_query_length: usize) -> Self {
        let (outcome, _) = watch::channel(SearchOutcome::Empty);
        Self {
            source,
            min_query_length: min_query_length.max(1),
            slot: Arc::new(RequestSlot::new()),
            outcome: Arc::new(outcome),
        }
    }

    pub fn min_query_length(&self) -> usize {
        self.min_query_length
    }

    /// Snapshot of the current outcome.
    pub fn outcome(&self) -> SearchOutcome {
        self.outcome.borrow().clone()
    }

    /// Receiver that observes every published outcome.
    pub fn subscribe(&self) -> watch::Receiver<SearchOutcome> {
        self.outcome.subscribe()
    }

    /// React to a new query value.
    ///
    /// Returns the handle of the spawned fetch, or None when the query is
    /// too short to search. Must be called from within a Tokio runtime.
    pub fn search(&self, query: &str) -> Option<JoinHandle<()>> {
        if query.chars().count() < self.min_query_length {
            let outcome = Arc::clone(&self.outcome);
            let cancelled = self.slot.cancel(move || {
                outcome.send_replace(SearchOutcome::Empty);
            });
            if cancelled {
                debug!(query, "Query too short, cancelled in-flight search");
            }
            return None;
        }

        let outcome = Arc::clone(&self.outcome);
        let ticket = self.slot.begin(move || {
            outcome.send_replace(SearchOutcome::Loading);
        });
        debug!(query, generation = ticket.generation(), "Search started");

        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let outcome = Arc::clone(&self.outcome);
        let query = query.to_string();

        Some(tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = ticket.token().cancelled() => {
                    debug!(query = %query, generation = ticket.generation(), "Search cancelled");
                    return;
                }
                result = source.search(&query) => result,
            };

            let next = match result {
                Ok(results) => {
                    info!(query = %query, count = results.len(), "Search succeeded");
                    SearchOutcome::Success(results)
                }
                Err(e) => {
                    info!(query = %query, error = %e, "Search failed");
                    SearchOutcome::Failure(e.message())
                }
            };

            let applied = slot.commit(&ticket, move || {
                outcome.send_replace(next);
            });
            if !applied {
                debug!(query = %query, generation = ticket.generation(), "Discarded stale search response");
            }
        }))
    }

    /// Wait until the outcome is no longer `Loading` and return it.
    pub async fn settled(&self) -> SearchOutcome {
        let mut rx = self.outcome.subscribe();
        let settled = match rx.wait_for(|outcome| !outcome.is_loading()).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => self.outcome(),
        };
        settled
    }

    /// Abandon any in-flight request and return to `Empty`.
    pub fn reset(&self) {
        let outcome = Arc::clone(&self.outcome);
        self.slot.cancel(move || {
            outcome.send_replace(SearchOutcome::Empty);
        });
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.slot.cancel(|| {});
    }
}

#[cfg(test)]
mod tests;
