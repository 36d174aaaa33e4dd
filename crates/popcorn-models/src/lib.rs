pub mod detail;
pub mod search;
pub mod watched;

pub use detail::{DetailState, MovieDetail};
pub use search::{SearchOutcome, SearchResult};
pub use watched::WatchedEntry;
