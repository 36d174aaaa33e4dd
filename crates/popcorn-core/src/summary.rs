use popcorn_models::WatchedEntry;
use serde::Serialize;

/// Aggregate statistics over the watched list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

/// Mean of `values`, 0 for no values.
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Entries without a source rating or runtime are left out of that average only.
pub fn summarize(entries: &[WatchedEntry]) -> WatchedSummary {
    WatchedSummary {
        count: entries.len(),
        avg_imdb_rating: average(entries.iter().filter_map(|e| e.imdb_rating)),
        avg_user_rating: average(entries.iter().map(|e| f64::from(e.user_rating))),
        avg_runtime: average(entries.iter().filter_map(|e| e.runtime).map(f64::from)),
    }
}
