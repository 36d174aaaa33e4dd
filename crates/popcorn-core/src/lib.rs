pub mod details;
pub mod keys;
pub mod rating;
pub mod request_slot;
pub mod search;
pub mod session;
pub mod summary;
pub mod watched;

#[cfg(test)]
pub(crate) mod testing;

pub use details::{DetailCoordinator, SelectionHook};
pub use keys::{KeyBindings, Subscription};
pub use rating::{RatingError, RatingInput};
pub use request_slot::{RequestSlot, Ticket};
pub use search::SearchCoordinator;
pub use session::RatingSession;
pub use summary::{summarize, WatchedSummary};
pub use watched::{AddOutcome, WatchedStore};
