use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};

use crate::error::SourceError;

/// A remote movie database.
///
/// Object-safe so coordinators can hold `Arc<dyn MovieSource>` and tests can
/// substitute a scripted source.
#[async_trait]
pub trait MovieSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Title search. An empty list is a valid answer.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError>;

    /// Full record for one identifier.
    async fn get_details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError>;
}
