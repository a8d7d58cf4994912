//! Repository ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with the document
//! store. Each trait exposes a strongly typed persistence error so adapters
//! map their failures into predictable variants instead of returning
//! `anyhow::Result`. The Mongo adapter implements them against real
//! collections; the in-memory adapter backs tests and databaseless runs.

use async_trait::async_trait;
use thiserror::Error as ThisError;

use super::category::Category;
use super::error::Error;
use super::ids::{CategoryId, RecipeId, ReviewId, UserId};
use super::recipe::{Difficulty, Recipe};
use super::review::Review;
use super::user::{Role, User};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RepositoryError {
    /// Store connectivity failures.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query execution or document decoding failures.
    #[error("store query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// Helper for connection-level failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query and decoding failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(error: RepositoryError) -> Self {
        tracing::error!(error = %error, "persistence failure");
        Error::internal(error.to_string())
    }
}

/// Sort orders accepted by the recipe listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeSort {
    CreatedAtAsc,
    CreatedAtDesc,
    RatingAsc,
    RatingDesc,
    TitleAsc,
    TitleDesc,
}

impl RecipeSort {
    /// Parse the wire form: a field name with an optional `-` prefix for
    /// descending order.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" => Some(Self::CreatedAtAsc),
            "-createdAt" => Some(Self::CreatedAtDesc),
            "rating" => Some(Self::RatingAsc),
            "-rating" => Some(Self::RatingDesc),
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            _ => None,
        }
    }
}

impl Default for RecipeSort {
    fn default() -> Self {
        Self::CreatedAtDesc
    }
}

/// Filter, sort, and pagination parameters for the recipe listing.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
    pub sort: RecipeSort,
    /// One-based page number.
    pub page: u64,
    pub limit: u64,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            search: None,
            sort: RecipeSort::default(),
            page: 1,
            limit: 10,
        }
    }
}

/// A page of recipes together with the total match count.
#[derive(Debug, Clone)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: u64,
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError>;
    /// All accounts, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError>;
}

/// Persistence port for categories.
#[async_trait]
pub trait CategoriesRepository: Send + Sync {
    async fn insert(&self, category: Category) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError>;
    /// Exact, case-sensitive name lookup used for the uniqueness check.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError>;
    async fn update(&self, category: &Category) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError>;
    /// All categories, sorted by name.
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;
}

/// Persistence port for recipes.
#[async_trait]
pub trait RecipesRepository: Send + Sync {
    async fn insert(&self, recipe: Recipe) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, RepositoryError>;
    async fn update(&self, recipe: &Recipe) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &RecipeId) -> Result<(), RepositoryError>;
    /// Filtered, sorted, paginated listing.
    async fn list(&self, query: &RecipeQuery) -> Result<RecipePage, RepositoryError>;
    /// All recipes in a category, newest first.
    async fn list_by_category(&self, category: &CategoryId)
        -> Result<Vec<Recipe>, RepositoryError>;
    /// Most recently created recipes.
    async fn recent(&self, limit: usize) -> Result<Vec<Recipe>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Persistence port for reviews.
#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    async fn insert(&self, review: Review) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError>;
    /// Lookup backing the one-review-per-(user, recipe) invariant.
    async fn find_by_recipe_and_user(
        &self,
        recipe: &RecipeId,
        user: &UserId,
    ) -> Result<Option<Review>, RepositoryError>;
    async fn update(&self, review: &Review) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &ReviewId) -> Result<(), RepositoryError>;
    /// Remove every review of a recipe; used when the recipe is deleted.
    async fn delete_by_recipe(&self, recipe: &RecipeId) -> Result<(), RepositoryError>;
    /// Reviews of a recipe, newest first.
    async fn list_by_recipe(&self, recipe: &RecipeId) -> Result<Vec<Review>, RepositoryError>;
    /// Reviews written by a user, newest first.
    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Review>, RepositoryError>;
    /// Every review, newest first.
    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError>;
    /// Most recently created reviews.
    async fn recent(&self, limit: usize) -> Result<Vec<Review>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
