use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A title the user has watched and rated.
///
/// Field names on disk follow the browser app's `watched` key so existing
/// exports load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: Option<String>,
    pub runtime: Option<u32>, // minutes
    pub imdb_rating: Option<f64>,
    pub user_rating: u8,
    #[serde(default)]
    pub count_rating_decisions: u32,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}
