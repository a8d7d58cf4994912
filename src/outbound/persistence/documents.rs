//! BSON document models for the Mongo adapter.
//!
//! Stored documents keep identifiers as canonical UUID strings and
//! timestamps as epoch milliseconds, so the wire format stays independent
//! of the domain types. Conversions back into domain entities fail with a
//! decoding error rather than panicking on corrupt documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::domain::ports::RepositoryError;
use crate::domain::recipe::NewRecipe;
use crate::domain::{
    Category, CategoryId, Difficulty, Rating, Recipe, RecipeId, Review, ReviewId, Role, User,
    UserId,
};

/// Raised when a stored document cannot be decoded into a domain entity.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub(crate) enum DocumentError {
    #[error("invalid identifier in stored document: {0}")]
    Id(String),
    #[error("invalid timestamp in stored document: {0}")]
    Timestamp(i64),
    #[error("invalid field in stored document: {0}")]
    Field(String),
}

impl From<DocumentError> for RepositoryError {
    fn from(error: DocumentError) -> Self {
        RepositoryError::query(error.to_string())
    }
}

fn parse_uuid(raw: &str) -> Result<uuid::Uuid, DocumentError> {
    uuid::Uuid::parse_str(raw).map_err(|_| DocumentError::Id(raw.to_owned()))
}

fn decode_timestamp(millis: i64) -> Result<DateTime<Utc>, DocumentError> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or(DocumentError::Timestamp(millis))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub favorites: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.to_string(),
            avatar: user.avatar.clone(),
            favorites: user.favorites.iter().map(RecipeId::to_string).collect(),
            created_at: user.created_at.timestamp_millis(),
            updated_at: user.updated_at.timestamp_millis(),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = DocumentError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let favorites = doc
            .favorites
            .iter()
            .map(|raw| parse_uuid(raw).map(RecipeId::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: UserId::from(parse_uuid(&doc.id)?),
            name: doc.name,
            email: doc.email,
            password_hash: doc.password_hash,
            role: doc
                .role
                .parse::<Role>()
                .map_err(|err| DocumentError::Field(err.to_string()))?,
            avatar: doc.avatar,
            favorites,
            created_at: decode_timestamp(doc.created_at)?,
            updated_at: decode_timestamp(doc.updated_at)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CategoryDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub recipe_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Category> for CategoryDocument {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            bg_color: category.bg_color.clone(),
            recipe_count: category.recipe_count as i64,
            created_at: category.created_at.timestamp_millis(),
            updated_at: category.updated_at.timestamp_millis(),
        }
    }
}

impl TryFrom<CategoryDocument> for Category {
    type Error = DocumentError;

    fn try_from(doc: CategoryDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::from(parse_uuid(&doc.id)?),
            name: doc.name,
            slug: doc.slug,
            description: doc.description,
            icon: doc.icon,
            color: doc.color,
            bg_color: doc.bg_color,
            recipe_count: doc.recipe_count.max(0) as u64,
            created_at: decode_timestamp(doc.created_at)?,
            updated_at: decode_timestamp(doc.updated_at)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecipeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub difficulty: String,
    pub category: String,
    pub author: String,
    pub rating: f64,
    pub review_count: i64,
    pub favorites_count: i64,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Recipe> for RecipeDocument {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            title: recipe.title.clone(),
            slug: recipe.slug.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            difficulty: recipe.difficulty.to_string(),
            category: recipe.category.to_string(),
            author: recipe.author.to_string(),
            rating: recipe.rating,
            review_count: recipe.review_count as i64,
            favorites_count: recipe.favorites_count as i64,
            image: recipe.image.clone(),
            created_at: recipe.created_at.timestamp_millis(),
            updated_at: recipe.updated_at.timestamp_millis(),
        }
    }
}

impl TryFrom<RecipeDocument> for Recipe {
    type Error = DocumentError;

    fn try_from(doc: RecipeDocument) -> Result<Self, Self::Error> {
        let mut recipe = Recipe::new(NewRecipe {
            title: doc.title,
            slug: doc.slug,
            description: doc.description,
            ingredients: doc.ingredients,
            steps: doc.steps,
            difficulty: doc
                .difficulty
                .parse::<Difficulty>()
                .map_err(|err| DocumentError::Field(err.to_string()))?,
            category: CategoryId::from(parse_uuid(&doc.category)?),
            author: UserId::from(parse_uuid(&doc.author)?),
            image: doc.image,
        });
        recipe.id = RecipeId::from(parse_uuid(&doc.id)?);
        recipe.rating = doc.rating;
        recipe.review_count = doc.review_count.max(0) as u64;
        recipe.favorites_count = doc.favorites_count.max(0) as u64;
        recipe.created_at = decode_timestamp(doc.created_at)?;
        recipe.updated_at = decode_timestamp(doc.updated_at)?;
        Ok(recipe)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ReviewDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub recipe: String,
    pub user: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Review> for ReviewDocument {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            recipe: review.recipe.to_string(),
            user: review.user.to_string(),
            rating: i32::from(review.rating.value()),
            comment: review.comment.clone(),
            created_at: review.created_at.timestamp_millis(),
            updated_at: review.updated_at.timestamp_millis(),
        }
    }
}

impl TryFrom<ReviewDocument> for Review {
    type Error = DocumentError;

    fn try_from(doc: ReviewDocument) -> Result<Self, Self::Error> {
        let raw_rating =
            u8::try_from(doc.rating).map_err(|_| DocumentError::Field("rating".to_owned()))?;
        Ok(Self {
            id: ReviewId::from(parse_uuid(&doc.id)?),
            recipe: RecipeId::from(parse_uuid(&doc.recipe)?),
            user: UserId::from(parse_uuid(&doc.user)?),
            rating: Rating::new(raw_rating)
                .map_err(|err| DocumentError::Field(err.to_string()))?,
            comment: doc.comment,
            created_at: decode_timestamp(doc.created_at)?,
            updated_at: decode_timestamp(doc.updated_at)?,
        })
    }
}
