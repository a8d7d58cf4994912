//! Recipe categories.

use chrono::{DateTime, Utc};

use super::ids::CategoryId;
use super::slug::slugify;

/// A recipe category. Name and slug are unique across the collection;
/// `recipe_count` is denormalized and maintained by the recipe handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub recipe_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a category with a slug derived from its name.
    pub fn new(name: String, description: String, icon: String, color: String, bg_color: String) -> Self {
        let now = Utc::now();
        let slug = slugify(&name);
        Self {
            id: CategoryId::generate(),
            name,
            slug,
            description,
            icon,
            color,
            bg_color,
            recipe_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the category, re-deriving its slug.
    pub fn rename(&mut self, name: String) {
        self.slug = slugify(&name);
        self.name = name;
        self.updated_at = Utc::now();
    }
}
