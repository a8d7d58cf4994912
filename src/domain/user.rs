//! User accounts, roles, and the favorites toggle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

use super::ids::{RecipeId, UserId};

/// Account role. Admins may mutate any resource and reach the admin
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// Raised when a raw role string is neither `user` nor `admin`.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Raised by the favorites toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum FavoriteError {
    /// The recipe is already in the favorites set.
    #[error("recipe already in favorites")]
    AlreadyPresent,
    /// The recipe is not in the favorites set.
    #[error("recipe not in favorites")]
    NotPresent,
}

/// A registered account. The password hash never leaves the persistence
/// and authentication layers; response DTOs are built from the remaining
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar: Option<String>,
    /// Ordered set of favorite recipe references, free of duplicates.
    pub favorites: Vec<RecipeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account with fresh id and timestamps and no favorites.
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            name,
            email,
            password_hash,
            role,
            avatar: None,
            favorites: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this account holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the recipe is currently in the favorites set.
    pub fn has_favorite(&self, recipe: &RecipeId) -> bool {
        self.favorites.contains(recipe)
    }

    /// Add a recipe to the favorites set.
    ///
    /// Fails with [`FavoriteError::AlreadyPresent`] when the reference is
    /// already stored, keeping the set free of duplicates.
    pub fn add_favorite(&mut self, recipe: RecipeId) -> Result<(), FavoriteError> {
        if self.has_favorite(&recipe) {
            return Err(FavoriteError::AlreadyPresent);
        }
        self.favorites.push(recipe);
        Ok(())
    }

    /// Remove a recipe from the favorites set.
    ///
    /// Fails with [`FavoriteError::NotPresent`] when the reference is not
    /// stored.
    pub fn remove_favorite(&mut self, recipe: &RecipeId) -> Result<(), FavoriteError> {
        let before = self.favorites.len();
        self.favorites.retain(|stored| stored != recipe);
        if self.favorites.len() == before {
            return Err(FavoriteError::NotPresent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn account() -> User {
        User::new(
            "Ada".to_owned(),
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            Role::User,
        )
    }

    #[test]
    fn add_favorite_rejects_duplicates() {
        let mut user = account();
        let recipe = RecipeId::generate();
        user.add_favorite(recipe).expect("first add succeeds");
        assert_eq!(
            user.add_favorite(recipe),
            Err(FavoriteError::AlreadyPresent)
        );
        assert_eq!(user.favorites.len(), 1);
    }

    #[test]
    fn remove_favorite_requires_presence() {
        let mut user = account();
        let recipe = RecipeId::generate();
        assert_eq!(
            user.remove_favorite(&recipe),
            Err(FavoriteError::NotPresent)
        );
        user.add_favorite(recipe).expect("add succeeds");
        user.remove_favorite(&recipe).expect("remove succeeds");
        assert!(user.favorites.is_empty());
    }

    #[test]
    fn remove_preserves_other_entries() {
        let mut user = account();
        let first = RecipeId::generate();
        let second = RecipeId::generate();
        user.add_favorite(first).expect("add first");
        user.add_favorite(second).expect("add second");
        user.remove_favorite(&first).expect("remove first");
        assert_eq!(user.favorites, vec![second]);
    }

    #[rstest]
    #[case("user", Role::User)]
    #[case("admin", Role::Admin)]
    fn role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!("owner".parse::<Role>().is_err());
    }
}
