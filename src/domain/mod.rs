//! Domain entities and rules for the recipe-sharing service.
//!
//! Purpose: keep the data rules (slug derivation, rating aggregation, the
//! favorites toggle, and the owner-or-admin authorization check) free of
//! transport and storage concerns. Inbound adapters translate the error
//! taxonomy into HTTP responses; outbound adapters persist the entities.

pub mod auth;
pub mod category;
pub mod error;
pub mod ids;
pub mod ports;
pub mod rating;
pub mod recipe;
pub mod review;
pub mod slug;
pub mod user;

pub use self::category::Category;
pub use self::error::{Error, ErrorCode};
pub use self::ids::{CategoryId, RecipeId, ReviewId, UserId};
pub use self::rating::RatingSummary;
pub use self::recipe::{Difficulty, Recipe};
pub use self::review::{Rating, Review};
pub use self::slug::slugify;
pub use self::user::{FavoriteError, Role, User};

/// Convenient result alias for handlers and services.
pub type ApiResult<T> = Result<T, Error>;
