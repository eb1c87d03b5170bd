//! Reviews and their comments.
//!
//! Ownership is the unit of object-level permission: both entities carry an
//! `author` reference that the permission evaluator compares against the
//! requesting actor.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalogue::TitleId;
use super::user::UserId;

/// Validation errors for review components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Review or comment text was empty once trimmed.
    #[error("text must not be empty")]
    EmptyText,
    /// Scores live on a closed 1..=10 scale.
    #[error("score must be between {min} and {max}")]
    ScoreOutOfRange {
        /// Lowest accepted score.
        min: u8,
        /// Highest accepted score.
        max: u8,
    },
}

/// Lowest accepted review score.
pub const SCORE_MIN: u8 = 1;
/// Highest accepted review score.
pub const SCORE_MAX: u8 = 10;

/// Review score on a closed 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Validate and construct a [`Score`].
    pub const fn new(score: u8) -> Result<Self, ReviewValidationError> {
        if score < SCORE_MIN || score > SCORE_MAX {
            return Err(ReviewValidationError::ScoreOutOfRange {
                min: SCORE_MIN,
                max: SCORE_MAX,
            });
        }
        Ok(Self(score))
    }

    /// The score as a plain integer.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ReviewValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-empty body text shared by reviews and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BodyText(String);

impl BodyText {
    /// Validate and construct a [`BodyText`].
    pub fn new(text: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let raw = text.into();
        if raw.trim().is_empty() {
            return Err(ReviewValidationError::EmptyText);
        }
        Ok(Self(raw))
    }

    /// Borrow the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for BodyText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<BodyText> for String {
    fn from(value: BodyText) -> Self {
        value.0
    }
}

impl TryFrom<String> for BodyText {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stable review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReviewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Stable comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CommentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A scored review of a title. One review per (title, author) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Stable identifier.
    pub id: ReviewId,
    /// Reviewed title.
    pub title: TitleId,
    /// Owning user; the unit of object-level permission.
    pub author: UserId,
    /// Review body.
    pub text: BodyText,
    /// Score on the 1..=10 scale.
    pub score: Score,
    /// Creation timestamp.
    pub pub_date: DateTime<Utc>,
}

impl Review {
    /// Create a review with a fresh identifier, stamped now.
    #[must_use]
    pub fn new(title: TitleId, author: UserId, text: BodyText, score: Score) -> Self {
        Self {
            id: ReviewId::random(),
            title,
            author,
            text,
            score,
            pub_date: Utc::now(),
        }
    }
}

/// A comment attached to a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Stable identifier.
    pub id: CommentId,
    /// Parent review.
    pub review: ReviewId,
    /// Owning user; the unit of object-level permission.
    pub author: UserId,
    /// Comment body.
    pub text: BodyText,
    /// Creation timestamp.
    pub pub_date: DateTime<Utc>,
}

impl Comment {
    /// Create a comment with a fresh identifier, stamped now.
    #[must_use]
    pub fn new(review: ReviewId, author: UserId, text: BodyText) -> Self {
        Self {
            id: CommentId::random(),
            review,
            author,
            text,
            pub_date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(10)]
    fn score_accepts_the_closed_range_bounds(#[case] raw: u8) {
        assert_eq!(Score::new(raw).expect("valid score").get(), raw);
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn score_rejects_out_of_range_values(#[case] raw: u8) {
        assert_eq!(
            Score::new(raw).expect_err("invalid score"),
            ReviewValidationError::ScoreOutOfRange {
                min: SCORE_MIN,
                max: SCORE_MAX
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn body_text_rejects_blank_input(#[case] raw: &str) {
        assert_eq!(
            BodyText::new(raw).expect_err("blank text"),
            ReviewValidationError::EmptyText
        );
    }
}
