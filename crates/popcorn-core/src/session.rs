use crate::rating::{RatingError, RatingInput};
use crate::watched::WatchedStore;
use chrono::Utc;
use popcorn_models::{MovieDetail, WatchedEntry};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

/// Rating state for one opened title.
///
/// Counts how many times the user changed their mind before adding the
/// title: every commit that differs from the previous rating is a decision.
#[derive(Debug)]
pub struct RatingSession {
    detail: MovieDetail,
    input: RatingInput,
    decisions: Arc<AtomicU32>,
    watched_rating: Option<u8>,
}

impl RatingSession {
    pub fn new(detail: MovieDetail, max_rating: u8, watched: &WatchedStore) -> Self {
        let watched_rating = watched.user_rating_for(&detail.imdb_id);

        let decisions = Arc::new(AtomicU32::new(0));
        let last = Arc::new(AtomicU8::new(0));
        let counter = Arc::clone(&decisions);
        let input = RatingInput::new(max_rating).on_rate(move |value| {
            if last.swap(value, Ordering::SeqCst) != value {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        Self {
            detail,
            input,
            decisions,
            watched_rating,
        }
    }

    pub fn detail(&self) -> &MovieDetail {
        &self.detail
    }

    pub fn input(&self) -> &RatingInput {
        &self.input
    }

    pub fn is_watched(&self) -> bool {
        self.watched_rating.is_some()
    }

    /// Rating given when the title was added, if it is already on the list.
    pub fn watched_rating(&self) -> Option<u8> {
        self.watched_rating
    }

    pub fn rate(&mut self, position: u8) -> Result<u8, RatingError> {
        self.input.rate(position)
    }

    pub fn hover(&mut self, position: u8) -> Result<(), RatingError> {
        self.input.hover(position)
    }

    pub fn clear_hover(&mut self) {
        self.input.clear_hover();
    }

    pub fn decisions(&self) -> u32 {
        self.decisions.load(Ordering::SeqCst)
    }

    /// A rating has been chosen and the title is not on the list yet.
    pub fn can_add(&self) -> bool {
        self.input.rating() > 0 && !self.is_watched()
    }

    /// Build the list entry from the detail and the committed rating.
    pub fn to_entry(&self) -> Option<WatchedEntry> {
        let user_rating = self.input.rating();
        if user_rating == 0 {
            return None;
        }
        Some(WatchedEntry {
            imdb_id: self.detail.imdb_id.clone(),
            title: self.detail.title.clone(),
            year: self.detail.year.clone(),
            poster: self.detail.poster.clone(),
            runtime: self.detail.runtime_minutes(),
            imdb_rating: self.detail.source_rating(),
            user_rating,
            count_rating_decisions: self.decisions(),
            added_at: Utc::now(),
        })
    }
}
