use crate::request_slot::RequestSlot;
use popcorn_models::DetailState;
use popcorn_sources::MovieSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Called with the loaded title when a detail view becomes active and with
/// `None` once that selection ends (closed, or replaced by another open).
///
/// Runs while the coordinator's request slot is held, so it must not call
/// back into the coordinator.
pub type SelectionHook = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Hook plus whether it has been given a title that was not yet withdrawn.
#[derive(Clone)]
struct Selection {
    hook: SelectionHook,
    active: Arc<AtomicBool>,
}

impl Selection {
    fn loaded(&self, title: &str) {
        self.active.store(true, Ordering::SeqCst);
        (self.hook)(Some(title));
    }

    fn ended(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            (self.hook)(None);
        }
    }
}

/// Latest-only loader for the selected title.
pub struct DetailCoordinator {
    source: Arc<dyn MovieSource>,
    slot: Arc<RequestSlot>,
    state: Arc<watch::Sender<DetailState>>,
    selection: Option<Selection>,
}

impl DetailCoordinator {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        let (state, _) = watch::channel(DetailState::Closed);
        Self {
            source,
            slot: Arc::new(RequestSlot::new()),
            state: Arc::new(state),
            selection: None,
        }
    }

    pub fn with_selection_hook(mut self, hook: SelectionHook) -> Self {
        self.selection = Some(Selection {
            hook,
            active: Arc::new(AtomicBool::new(false)),
        });
        self
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state.borrow().selected_id().map(str::to_string)
    }

    /// Start loading `imdb_id`, superseding any detail still in flight.
    pub fn open(&self, imdb_id: &str) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let id = imdb_id.to_string();
        let selection = self.selection.clone();
        let ticket = self.slot.begin(move || {
            state.send_replace(DetailState::Loading { imdb_id: id });
            if let Some(selection) = selection {
                selection.ended();
            }
        });
        debug!(imdb_id, generation = ticket.generation(), "Loading title details");

        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let state = Arc::clone(&self.state);
        let selection = self.selection.clone();
        let imdb_id = imdb_id.to_string();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = ticket.token().cancelled() => {
                    debug!(imdb_id = %imdb_id, "Detail request cancelled");
                    return;
                }
                result = source.get_details(&imdb_id) => result,
            };

            let applied = slot.commit(&ticket, move || match result {
                Ok(detail) => {
                    info!(imdb_id = %imdb_id, title = %detail.title, "Title details loaded");
                    let title = detail.title.clone();
                    state.send_replace(DetailState::Loaded(detail));
                    if let Some(selection) = selection {
                        selection.loaded(&title);
                    }
                }
                Err(e) => {
                    info!(imdb_id = %imdb_id, error = %e, "Title details failed");
                    state.send_replace(DetailState::Failed {
                        imdb_id,
                        message: e.message(),
                    });
                }
            });
            if !applied {
                debug!(generation = ticket.generation(), "Discarded stale detail response");
            }
        })
    }

    /// Close the view and drop any detail still in flight.
    pub fn close(&self) {
        let state = Arc::clone(&self.state);
        let selection = self.selection.clone();
        self.slot.cancel(move || {
            state.send_replace(DetailState::Closed);
            if let Some(selection) = selection {
                selection.ended();
            }
        });
    }

    /// Selecting the title that is already selected closes it.
    pub fn toggle(&self, imdb_id: &str) -> Option<JoinHandle<()>> {
        if self.selected_id().as_deref() == Some(imdb_id) {
            self.close();
            None
        } else {
            Some(self.open(imdb_id))
        }
    }

    /// Wait until the view is not loading and return its state.
    pub async fn settled(&self) -> DetailState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for DetailCoordinator {
    fn drop(&mut self) {
        self.slot.cancel(|| {});
    }
}

#[cfg(test)]
mod tests;
