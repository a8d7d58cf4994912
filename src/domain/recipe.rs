//! Recipes and their aggregate state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

use super::ids::{CategoryId, RecipeId, UserId};
use super::rating::RatingSummary;

/// Coarse difficulty bucket used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Raised when a raw difficulty string is not a known bucket.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(UnknownDifficulty(other.to_owned())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => f.write_str("easy"),
            Self::Medium => f.write_str("medium"),
            Self::Hard => f.write_str("hard"),
        }
    }
}

/// A published recipe.
///
/// `rating` and `review_count` mirror the review set and are rewritten by
/// the aggregation step after every review mutation; `favorites_count`
/// mirrors how many users currently favorite the recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub difficulty: Difficulty,
    pub category: CategoryId,
    pub author: UserId,
    pub rating: f64,
    pub review_count: u64,
    pub favorites_count: u64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field bundle for creating a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub difficulty: Difficulty,
    pub category: CategoryId,
    pub author: UserId,
    pub image: Option<String>,
}

impl Recipe {
    /// Create a recipe with fresh id, zeroed aggregates, and timestamps.
    pub fn new(fields: NewRecipe) -> Self {
        let now = Utc::now();
        let NewRecipe {
            title,
            slug,
            description,
            ingredients,
            steps,
            difficulty,
            category,
            author,
            image,
        } = fields;
        Self {
            id: RecipeId::generate(),
            title,
            slug,
            description,
            ingredients,
            steps,
            difficulty,
            category,
            author,
            rating: 0.0,
            review_count: 0,
            favorites_count: 0,
            image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the aggregate rating state from a freshly computed summary.
    pub fn apply_rating(&mut self, summary: RatingSummary) {
        self.rating = summary.rating;
        self.review_count = summary.review_count;
        self.updated_at = Utc::now();
    }
}
