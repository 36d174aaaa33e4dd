/// Failures a movie source can report.
///
/// The coordinators turn every variant into a user-visible message; none of
/// them escape further.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Network failure or non-success HTTP status.
    #[error("{0}")]
    Transport(String),
    /// The service answered but reported no match, e.g. "Movie not found!".
    #[error("{0}")]
    NotFound(String),
    /// The body could not be understood.
    #[error("Unexpected response from the movie database: {0}")]
    Decode(String),
    /// The source is missing something it needs before any request is made.
    #[error("Source not configured: {0}")]
    Configuration(String),
}

impl SourceError {
    /// Text to show the user for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
