//! Reviews and their bounded rating value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::ids::{RecipeId, ReviewId, UserId};

/// A review rating, constrained to the inclusive range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

/// Raised when a rating falls outside the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("rating must be between {} and {}", Rating::MIN, Rating::MAX)]
pub struct RatingOutOfRange(pub u8);

impl Rating {
    /// Smallest accepted rating.
    pub const MIN: u8 = 1;
    /// Largest accepted rating.
    pub const MAX: u8 = 5;

    /// Validate a raw rating value.
    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange(value))
        }
    }

    /// The underlying numeric value.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// A user's review of a recipe. At most one review exists per
/// (user, recipe) pair; repositories enforce the invariant through an
/// existence check before insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub recipe: RecipeId,
    pub user: UserId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Create a new review with fresh id and timestamps.
    pub fn new(recipe: RecipeId, user: UserId, rating: Rating, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::generate(),
            recipe,
            user,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(3, true)]
    #[case(5, true)]
    #[case(0, false)]
    #[case(6, false)]
    fn rating_enforces_bounds(#[case] raw: u8, #[case] accepted: bool) {
        assert_eq!(Rating::new(raw).is_ok(), accepted);
    }

    #[test]
    fn rating_serialises_as_bare_number() {
        let rating = Rating::new(4).expect("in range");
        assert_eq!(serde_json::to_string(&rating).expect("serialise"), "4");
    }
}
