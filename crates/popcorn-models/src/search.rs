use serde::{Deserialize, Serialize};

/// One row of a title search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>, // None when the source reports "N/A"
}

/// Current state of a search.
///
/// Exactly one variant holds at a time. `Empty` covers both "nothing typed
/// yet" and "query too short to search".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum SearchOutcome {
    #[default]
    Empty,
    Loading,
    Success(Vec<SearchResult>),
    Failure(String),
}

impl SearchOutcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchOutcome::Loading)
    }

    /// Results of a successful search, empty for every other state.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Success(results) => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchOutcome::Failure(message) => Some(message),
            _ => None,
        }
    }
}
