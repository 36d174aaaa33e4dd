use std::fmt;

pub const DEFAULT_MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating {value} is outside 1..={max}")]
    OutOfRange { value: u8, max: u8 },
}

pub type RatingCallback = Box<dyn FnMut(u8) + Send>;

/// Star-rating input: a committed value, a transient hover preview, and a
/// callback fired on every commit.
pub struct RatingInput {
    max_rating: u8,
    rating: u8,
    hover: u8,
    messages: Vec<String>,
    on_rate: Option<RatingCallback>,
}

impl RatingInput {
    pub fn new(max_rating: u8) -> Self {
        Self {
            max_rating: max_rating.max(1),
            rating: 0,
            hover: 0,
            messages: Vec::new(),
            on_rate: None,
        }
    }

    /// Start with a committed rating; values above the scale are clamped.
    pub fn with_default_rating(mut self, rating: u8) -> Self {
        self.rating = rating.min(self.max_rating);
        self
    }

    /// One label per position, shown instead of the number.
    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages;
        self
    }

    pub fn on_rate(mut self, callback: impl FnMut(u8) + Send + 'static) -> Self {
        self.on_rate = Some(Box::new(callback));
        self
    }

    pub fn max_rating(&self) -> u8 {
        self.max_rating
    }

    /// Committed rating, 0 when nothing has been chosen.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn hover_rating(&self) -> Option<u8> {
        (self.hover > 0).then_some(self.hover)
    }

    fn check(&self, position: u8) -> Result<u8, RatingError> {
        if position == 0 || position > self.max_rating {
            return Err(RatingError::OutOfRange {
                value: position,
                max: self.max_rating,
            });
        }
        Ok(position)
    }

    /// Commit `position` and notify the callback.
    pub fn rate(&mut self, position: u8) -> Result<u8, RatingError> {
        let rating = self.check(position)?;
        self.rating = rating;
        if let Some(callback) = self.on_rate.as_mut() {
            callback(rating);
        }
        Ok(rating)
    }

    pub fn hover(&mut self, position: u8) -> Result<(), RatingError> {
        self.hover = self.check(position)?;
        Ok(())
    }

    pub fn clear_hover(&mut self) {
        self.hover = 0;
    }

    /// Hover preview if any, otherwise the committed rating.
    pub fn displayed(&self) -> u8 {
        if self.hover > 0 {
            self.hover
        } else {
            self.rating
        }
    }

    /// Whether star `position` (1-based) is drawn filled.
    pub fn is_filled(&self, position: u8) -> bool {
        position >= 1 && position <= self.displayed()
    }

    /// Text next to the stars: the label for the shown value, its number, or nothing.
    pub fn label(&self) -> String {
        let shown = self.displayed();
        if shown == 0 {
            return String::new();
        }
        if self.messages.len() == usize::from(self.max_rating) {
            return self.messages[usize::from(shown) - 1].clone();
        }
        shown.to_string()
    }
}

impl Default for RatingInput {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RATING)
    }
}

impl fmt::Debug for RatingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatingInput")
            .field("max_rating", &self.max_rating)
            .field("rating", &self.rating)
            .field("hover", &self.hover)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RatingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in 1..=self.max_rating {
            f.write_str(if self.is_filled(position) { "★" } else { "☆" })?;
        }
        let label = self.label();
        if !label.is_empty() {
            write!(f, " {}", label)?;
        }
        Ok(())
    }
}
