//! In-memory repository adapter.
//!
//! Mirrors the Mongo adapter's semantics over in-process maps so tests and
//! databaseless runs exercise the exact same handler logic. Cloning the
//! store shares the underlying state.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{
    CategoriesRepository, RecipePage, RecipeQuery, RecipeSort, RecipesRepository, RepositoryError,
    ReviewsRepository, UsersRepository,
};
use crate::domain::{Category, CategoryId, Recipe, RecipeId, Review, ReviewId, Role, User, UserId};

#[derive(Default)]
struct StoreInner {
    users: HashMap<UserId, User>,
    categories: HashMap<CategoryId, Category>,
    recipes: HashMap<RecipeId, Recipe>,
    reviews: HashMap<ReviewId, Review>,
}

/// Shared in-memory document store implementing every repository port.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreInner>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::query("store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::query("store lock poisoned"))
    }
}

fn newest_first<T, F>(items: &mut [T], created_at: F)
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

fn matches_query(recipe: &Recipe, query: &RecipeQuery) -> bool {
    if let Some(category) = &query.category {
        if recipe.category != *category {
            return false;
        }
    }
    if let Some(difficulty) = query.difficulty {
        if recipe.difficulty != difficulty {
            return false;
        }
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let in_title = recipe.title.to_lowercase().contains(&needle);
        let in_description = recipe.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }
    true
}

fn sort_recipes(recipes: &mut [Recipe], sort: RecipeSort) {
    recipes.sort_by(|a, b| match sort {
        RecipeSort::CreatedAtAsc => a.created_at.cmp(&b.created_at),
        RecipeSort::CreatedAtDesc => b.created_at.cmp(&a.created_at),
        RecipeSort::RatingAsc => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        RecipeSort::RatingDesc => b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal),
        RecipeSort::TitleAsc => a.title.cmp(&b.title),
        RecipeSort::TitleDesc => b.title.cmp(&a.title),
    });
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        self.write()?.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.write()?.users.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|user| user.role == role)
            .count() as u64)
    }
}

#[async_trait]
impl CategoriesRepository for MemoryStore {
    async fn insert(&self, category: Category) -> Result<(), RepositoryError> {
        self.write()?.categories.insert(category.id, category);
        Ok(())
    }

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.read()?.categories.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|category| category.name == name)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        self.write()?.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        self.write()?.categories.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> = self.read()?.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl RecipesRepository for MemoryStore {
    async fn insert(&self, recipe: Recipe) -> Result<(), RepositoryError> {
        self.write()?.recipes.insert(recipe.id, recipe);
        Ok(())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self.read()?.recipes.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self
            .read()?
            .recipes
            .values()
            .find(|recipe| recipe.slug == slug)
            .cloned())
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RepositoryError> {
        self.write()?.recipes.insert(recipe.id, recipe.clone());
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RepositoryError> {
        self.write()?.recipes.remove(id);
        Ok(())
    }

    async fn list(&self, query: &RecipeQuery) -> Result<RecipePage, RepositoryError> {
        let mut recipes: Vec<Recipe> = self
            .read()?
            .recipes
            .values()
            .filter(|recipe| matches_query(recipe, query))
            .cloned()
            .collect();
        let total = recipes.len() as u64;
        sort_recipes(&mut recipes, query.sort);
        let skip = query.page.saturating_sub(1).saturating_mul(query.limit) as usize;
        let recipes = recipes
            .into_iter()
            .skip(skip)
            .take(query.limit as usize)
            .collect();
        Ok(RecipePage { recipes, total })
    }

    async fn list_by_category(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let mut recipes: Vec<Recipe> = self
            .read()?
            .recipes
            .values()
            .filter(|recipe| recipe.category == *category)
            .cloned()
            .collect();
        newest_first(&mut recipes, |recipe| recipe.created_at);
        Ok(recipes)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Recipe>, RepositoryError> {
        let mut recipes: Vec<Recipe> = self.read()?.recipes.values().cloned().collect();
        newest_first(&mut recipes, |recipe| recipe.created_at);
        recipes.truncate(limit);
        Ok(recipes)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.read()?.recipes.len() as u64)
    }
}

#[async_trait]
impl ReviewsRepository for MemoryStore {
    async fn insert(&self, review: Review) -> Result<(), RepositoryError> {
        self.write()?.reviews.insert(review.id, review);
        Ok(())
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(self.read()?.reviews.get(id).cloned())
    }

    async fn find_by_recipe_and_user(
        &self,
        recipe: &RecipeId,
        user: &UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        Ok(self
            .read()?
            .reviews
            .values()
            .find(|review| review.recipe == *recipe && review.user == *user)
            .cloned())
    }

    async fn update(&self, review: &Review) -> Result<(), RepositoryError> {
        self.write()?.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete(&self, id: &ReviewId) -> Result<(), RepositoryError> {
        self.write()?.reviews.remove(id);
        Ok(())
    }

    async fn delete_by_recipe(&self, recipe: &RecipeId) -> Result<(), RepositoryError> {
        self.write()?
            .reviews
            .retain(|_, review| review.recipe != *recipe);
        Ok(())
    }

    async fn list_by_recipe(&self, recipe: &RecipeId) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews: Vec<Review> = self
            .read()?
            .reviews
            .values()
            .filter(|review| review.recipe == *recipe)
            .cloned()
            .collect();
        newest_first(&mut reviews, |review| review.created_at);
        Ok(reviews)
    }

    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews: Vec<Review> = self
            .read()?
            .reviews
            .values()
            .filter(|review| review.user == *user)
            .cloned()
            .collect();
        newest_first(&mut reviews, |review| review.created_at);
        Ok(reviews)
    }

    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews: Vec<Review> = self.read()?.reviews.values().cloned().collect();
        newest_first(&mut reviews, |review| review.created_at);
        Ok(reviews)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews = self.list_all().await?;
        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.read()?.reviews.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::{Difficulty, NewRecipe};
    use crate::domain::{Rating, Role};
    use chrono::Duration;

    fn user(email: &str) -> User {
        User::new(
            "Tester".to_owned(),
            email.to_owned(),
            "hash".to_owned(),
            Role::User,
        )
    }

    fn recipe(title: &str, slug: &str, category: CategoryId) -> Recipe {
        Recipe::new(NewRecipe {
            title: title.to_owned(),
            slug: slug.to_owned(),
            description: String::new(),
            ingredients: vec!["stuff".to_owned()],
            steps: vec!["cook".to_owned()],
            difficulty: Difficulty::Easy,
            category,
            author: UserId::generate(),
            image: None,
        })
    }

    #[tokio::test]
    async fn finds_users_by_email() {
        let store = MemoryStore::new();
        let account = user("ada@example.com");
        UsersRepository::insert(&store, account.clone())
            .await
            .expect("insert");
        let found = store
            .find_by_email("ada@example.com")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, account.id);
        assert!(store
            .find_by_email("missing@example.com")
            .await
            .expect("lookup")
            .is_none());
    }

    #[tokio::test]
    async fn recipe_listing_filters_sorts_and_paginates() {
        let store = MemoryStore::new();
        let category = CategoryId::generate();
        let other = CategoryId::generate();
        let mut first = recipe("Apple Pie", "apple-pie", category);
        first.rating = 2.0;
        let mut second = recipe("Banana Bread", "banana-bread", category);
        second.rating = 5.0;
        second.created_at = first.created_at + Duration::seconds(1);
        let mut third = recipe("Apple Tart", "apple-tart", other);
        third.created_at = first.created_at + Duration::seconds(2);
        for item in [first.clone(), second.clone(), third.clone()] {
            RecipesRepository::insert(&store, item).await.expect("insert");
        }

        let page = RecipesRepository::list(
            &store,
            &RecipeQuery {
                category: Some(category),
                ..RecipeQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(page.total, 2);
        assert_eq!(page.recipes[0].slug, "banana-bread");

        let searched = RecipesRepository::list(
            &store,
            &RecipeQuery {
                search: Some("apple".to_owned()),
                sort: RecipeSort::TitleAsc,
                ..RecipeQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(searched.total, 2);
        assert_eq!(searched.recipes[0].slug, "apple-pie");

        let rated = RecipesRepository::list(
            &store,
            &RecipeQuery {
                sort: RecipeSort::RatingDesc,
                limit: 1,
                ..RecipeQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(rated.total, 3);
        assert_eq!(rated.recipes.len(), 1);
        assert_eq!(rated.recipes[0].slug, "banana-bread");

        let second_page = RecipesRepository::list(
            &store,
            &RecipeQuery {
                sort: RecipeSort::TitleAsc,
                page: 2,
                limit: 2,
                ..RecipeQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(second_page.recipes.len(), 1);
        assert_eq!(second_page.recipes[0].slug, "banana-bread");
    }

    #[tokio::test]
    async fn recipe_listing_survives_extreme_page_numbers() {
        let store = MemoryStore::new();
        let category = CategoryId::generate();
        RecipesRepository::insert(&store, recipe("Apple Pie", "apple-pie", category))
            .await
            .expect("insert");

        // The skip arithmetic must not overflow on hostile page numbers.
        let page = RecipesRepository::list(
            &store,
            &RecipeQuery {
                page: u64::MAX,
                limit: 100,
                ..RecipeQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(page.total, 1);
        assert!(page.recipes.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_recipe_cascades_to_its_reviews() {
        let store = MemoryStore::new();
        let category = CategoryId::generate();
        let kept = recipe("Kept", "kept", category);
        let dropped = recipe("Dropped", "dropped", category);
        let reviewer = UserId::generate();
        RecipesRepository::insert(&store, kept.clone())
            .await
            .expect("insert");
        RecipesRepository::insert(&store, dropped.clone())
            .await
            .expect("insert");
        for target in [kept.id, dropped.id] {
            ReviewsRepository::insert(
                &store,
                Review::new(
                    target,
                    reviewer,
                    Rating::new(4).expect("valid"),
                    "fine".to_owned(),
                ),
            )
            .await
            .expect("insert review");
        }

        store.delete_by_recipe(&dropped.id).await.expect("cascade");
        assert_eq!(ReviewsRepository::count(&store).await.expect("count"), 1);
        assert!(store
            .find_by_recipe_and_user(&kept.id, &reviewer)
            .await
            .expect("lookup")
            .is_some());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        UsersRepository::insert(&store, user("shared@example.com"))
            .await
            .expect("insert");
        assert_eq!(UsersRepository::count(&clone).await.expect("count"), 1);
    }
}
