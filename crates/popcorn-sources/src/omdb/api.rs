use popcorn_models::{MovieDetail, SearchResult};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SourceError;

pub const SEARCH_FAILED_MESSAGE: &str = "Something went wrong with fetching movies";
pub const DETAILS_FAILED_MESSAGE: &str = "Something went wrong with fetching movie details";

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

fn poster_url(poster: Option<String>) -> Option<String> {
    poster.filter(|p| !p.is_empty() && p != NOT_AVAILABLE)
}

fn is_false(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("false")
}

/// Interpret a search body: either a result list or an application-level error.
pub fn parse_search_body(body: &str) -> Result<Vec<SearchResult>, SourceError> {
    let parsed: OmdbSearchResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if is_false(&parsed.response) {
        let message = parsed.error.unwrap_or_else(|| "Movie not found!".to_string());
        return Err(SourceError::NotFound(message));
    }

    Ok(parsed
        .search
        .into_iter()
        .map(|item| SearchResult {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: poster_url(item.poster),
        })
        .collect())
}

/// Interpret a single-title body.
pub fn parse_title_body(body: &str) -> Result<MovieDetail, SourceError> {
    let parsed: OmdbTitle = serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if is_false(&parsed.response) {
        let message = parsed.error.unwrap_or_else(|| "Incorrect IMDb ID.".to_string());
        return Err(SourceError::NotFound(message));
    }

    Ok(MovieDetail {
        imdb_id: parsed.imdb_id,
        title: parsed.title,
        year: parsed.year,
        poster: poster_url(parsed.poster),
        runtime: parsed.runtime,
        imdb_rating: parsed.imdb_rating,
        plot: parsed.plot,
        released: parsed.released,
        actors: parsed.actors,
        director: parsed.director,
        genre: parsed.genre,
    })
}

/// Any non-success status is a transport failure carrying the generic message.
fn check_status(status: StatusCode, failure: &str) -> Result<(), SourceError> {
    if status.is_success() {
        return Ok(());
    }
    warn!(status = %status, "Movie database returned non-success status");
    Err(SourceError::Transport(failure.to_string()))
}

async fn get_body(client: &Client, base_url: &str, params: &[(&str, &str)], failure: &str) -> Result<String, SourceError> {
    let response = client.get(base_url).query(params).send().await.map_err(|e| {
        warn!(error = %e, "Request to movie database failed");
        SourceError::Transport(failure.to_string())
    })?;

    check_status(response.status(), failure)?;

    response.text().await.map_err(|e| {
        warn!(error = %e, "Failed to read movie database response body");
        SourceError::Transport(failure.to_string())
    })
}

/// Search titles by free text (`?s=`).
pub async fn search_titles(client: &Client, base_url: &str, api_key: &str, query: &str) -> Result<Vec<SearchResult>, SourceError> {
    debug!(query, "Searching titles");
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", query)], SEARCH_FAILED_MESSAGE).await?;
    let results = parse_search_body(&body)?;
    debug!(query, count = results.len(), "Search returned");
    Ok(results)
}

/// Fetch one title by identifier (`?i=`).
pub async fn get_title(client: &Client, base_url: &str, api_key: &str, imdb_id: &str) -> Result<MovieDetail, SourceError> {
    debug!(imdb_id, "Fetching title details");
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", imdb_id), ("plot", "short")], DETAILS_FAILED_MESSAGE).await?;
    parse_title_body(&body)
}
