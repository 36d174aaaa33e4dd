//! Scripted movie source for coordinator tests.

use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use popcorn_sources::{MovieSource, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

type SearchReply = Result<Vec<SearchResult>, SourceError>;
type DetailReply = Result<MovieDetail, SourceError>;

/// Each query or id answers with a canned reply, either immediately or
/// once the test releases it through the returned sender.
#[derive(Default)]
pub struct ScriptedSource {
    searches: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    details: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold_search(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.searches.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub fn answer_search(&self, query: &str, reply: SearchReply) {
        let _ = self.hold_search(query).send(reply);
    }

    pub fn hold_details(&self, imdb_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.details.lock().unwrap().insert(imdb_id.to_string(), rx);
        tx
    }

    pub fn answer_details(&self, imdb_id: &str, reply: DetailReply) {
        let _ = self.hold_details(imdb_id).send(reply);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieSource for ScriptedSource {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.searches.lock().unwrap().remove(query);
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::Transport("reply dropped".to_string()))),
            None => Ok(Vec::new()),
        }
    }

    async fn get_details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.details.lock().unwrap().remove(imdb_id);
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::Transport("reply dropped".to_string()))),
            None => Err(SourceError::NotFound("Incorrect IMDb ID.".to_string())),
        }
    }
}

pub fn result(imdb_id: &str, title: &str) -> SearchResult {
    SearchResult {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: None,
    }
}

pub fn detail(imdb_id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: None,
        runtime: "148 min".to_string(),
        imdb_rating: "8.8".to_string(),
        plot: "A thief who steals corporate secrets.".to_string(),
        released: "16 Jul 2010".to_string(),
        actors: "Leonardo DiCaprio".to_string(),
        director: "Christopher Nolan".to_string(),
        genre: "Action, Sci-Fi".to_string(),
    }
}
