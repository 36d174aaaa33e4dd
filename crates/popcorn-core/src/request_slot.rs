//! Single "current request" slot shared by the coordinators.
//!
//! Every request gets a [`Ticket`] carrying a generation number and a
//! cancellation token. Starting a new request or cancelling bumps the
//! generation and cancels the previous token, so a response can only be
//! applied while its ticket is still the current one. The check and the
//! state change happen under the same lock.

use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Default)]
pub struct RequestSlot {
    state: Mutex<SlotState>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Supersede whatever is outstanding and hand out a fresh ticket.
    ///
    /// `on_begin` runs under the slot lock, after the old request has been
    /// cancelled, so no stale commit can interleave with it.
    pub fn begin(&self, on_begin: impl FnOnce()) -> Ticket {
        let mut state = self.lock();
        if let Some(previous) = state.token.take() {
            previous.cancel();
        }
        state.generation += 1;

        let token = CancellationToken::new();
        state.token = Some(token.clone());
        on_begin();

        Ticket {
            generation: state.generation,
            token,
        }
    }

    /// Cancel the outstanding request, if any, without starting a new one.
    ///
    /// Returns true when a request was still in flight.
    pub fn cancel(&self, on_cancel: impl FnOnce()) -> bool {
        let mut state = self.lock();
        state.generation += 1;
        let outstanding = match state.token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        };
        on_cancel();
        outstanding
    }

    #[cfg(test)]
    fn is_current(&self, ticket: &Ticket) -> bool {
        let state = self.lock();
        state.generation == ticket.generation && !ticket.is_cancelled()
    }

    /// Apply a response if `ticket` is still current. Returns whether it was applied.
    pub fn commit(&self, ticket: &Ticket, apply: impl FnOnce()) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation || ticket.is_cancelled() {
            return false;
        }
        state.token = None;
        apply();
        true
    }

    /// True while a request holds the slot.
    #[cfg(test)]
    fn is_busy(&self) -> bool {
        self.lock().token.is_some()
    }
}
