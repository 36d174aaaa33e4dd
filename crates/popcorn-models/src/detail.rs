use serde::{Deserialize, Serialize};

/// Full record for a single title, fetched when a search result is selected.
///
/// Text fields are kept as the source formats them ("148 min", "8.8") so they
/// can be shown verbatim; [`MovieDetail::runtime_minutes`] and
/// [`MovieDetail::source_rating`] give the numeric forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub runtime: String,
    pub imdb_rating: String,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetail {
    /// Leading integer of the runtime text, e.g. "148 min" -> 148.
    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime.split_whitespace().next()?.parse().ok()
    }

    /// Source rating as a number; "N/A" and blanks yield None.
    pub fn source_rating(&self) -> Option<f64> {
        self.imdb_rating.trim().parse::<f64>().ok().filter(|r| r.is_finite())
    }
}

/// State of the detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Loading { imdb_id: String },
    Loaded(MovieDetail),
    Failed { imdb_id: String, message: String },
}

impl DetailState {
    /// Identifier of the title the view is showing or fetching.
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            DetailState::Closed => None,
            DetailState::Loading { imdb_id } | DetailState::Failed { imdb_id, .. } => Some(imdb_id),
            DetailState::Loaded(detail) => Some(&detail.imdb_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading { .. })
    }
}
