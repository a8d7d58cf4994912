//! MongoDB repository adapter.
//!
//! One collection per entity; unique indexes back the email, slug, and
//! one-review-per-(user, recipe) invariants as a second line of defence
//! behind the handlers' existence checks.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::documents::{CategoryDocument, RecipeDocument, ReviewDocument, UserDocument};
use crate::domain::ports::{
    CategoriesRepository, RecipePage, RecipeQuery, RecipeSort, RecipesRepository, RepositoryError,
    ReviewsRepository, UsersRepository,
};
use crate::domain::{Category, CategoryId, Recipe, RecipeId, Review, ReviewId, Role, User, UserId};

/// MongoDB-backed implementation of every repository port.
#[derive(Clone)]
pub struct MongoStore {
    users: Collection<UserDocument>,
    categories: Collection<CategoryDocument>,
    recipes: Collection<RecipeDocument>,
    reviews: Collection<ReviewDocument>,
}

fn driver_error(error: mongodb::error::Error) -> RepositoryError {
    RepositoryError::query(error.to_string())
}

fn sort_document(sort: RecipeSort) -> Document {
    match sort {
        RecipeSort::CreatedAtAsc => doc! { "created_at": 1 },
        RecipeSort::CreatedAtDesc => doc! { "created_at": -1 },
        RecipeSort::RatingAsc => doc! { "rating": 1 },
        RecipeSort::RatingDesc => doc! { "rating": -1 },
        RecipeSort::TitleAsc => doc! { "title": 1 },
        RecipeSort::TitleDesc => doc! { "title": -1 },
    }
}

fn recipe_filter(query: &RecipeQuery) -> Document {
    let mut filter = doc! {};
    if let Some(category) = &query.category {
        filter.insert("category", category.to_string());
    }
    if let Some(difficulty) = query.difficulty {
        filter.insert("difficulty", difficulty.to_string());
    }
    if let Some(search) = &query.search {
        let expression = doc! { "$regex": search.clone(), "$options": "i" };
        filter.insert(
            "$or",
            vec![
                doc! { "title": expression.clone() },
                doc! { "description": expression },
            ],
        );
    }
    filter
}

impl MongoStore {
    /// Connect to the database and ensure the uniqueness indexes exist.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|error| RepositoryError::connection(error.to_string()))?;
        let db = client.database(database);
        let store = Self {
            users: db.collection("users"),
            categories: db.collection("categories"),
            recipes: db.collection("recipes"),
            reviews: db.collection("reviews"),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(driver_error)?;
        self.categories
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(driver_error)?;
        self.categories
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(driver_error)?;
        self.recipes
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(driver_error)?;
        self.reviews
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "recipe": 1, "user": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(driver_error)?;
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for MongoStore {
    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        self.users
            .insert_one(UserDocument::from(&user))
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let doc = self
            .users
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        doc.map(User::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let doc = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(driver_error)?;
        doc.map(User::try_from).transpose().map_err(Into::into)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        self.users
            .replace_one(doc! { "_id": user.id.to_string() }, UserDocument::from(user))
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.users
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let docs: Vec<UserDocument> = self
            .users
            .find(doc! {})
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| User::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.users
            .count_documents(doc! {})
            .await
            .map_err(driver_error)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        self.users
            .count_documents(doc! { "role": role.to_string() })
            .await
            .map_err(driver_error)
    }
}

#[async_trait]
impl CategoriesRepository for MongoStore {
    async fn insert(&self, category: Category) -> Result<(), RepositoryError> {
        self.categories
            .insert_one(CategoryDocument::from(&category))
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        let doc = self
            .categories
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        doc.map(Category::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let doc = self
            .categories
            .find_one(doc! { "name": name })
            .await
            .map_err(driver_error)?;
        doc.map(Category::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let doc = self
            .categories
            .find_one(doc! { "slug": slug })
            .await
            .map_err(driver_error)?;
        doc.map(Category::try_from).transpose().map_err(Into::into)
    }

    async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        self.categories
            .replace_one(
                doc! { "_id": category.id.to_string() },
                CategoryDocument::from(category),
            )
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        self.categories
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let docs: Vec<CategoryDocument> = self
            .categories
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Category::try_from(doc).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl RecipesRepository for MongoStore {
    async fn insert(&self, recipe: Recipe) -> Result<(), RepositoryError> {
        self.recipes
            .insert_one(RecipeDocument::from(&recipe))
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let doc = self
            .recipes
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        doc.map(Recipe::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Recipe>, RepositoryError> {
        let doc = self
            .recipes
            .find_one(doc! { "slug": slug })
            .await
            .map_err(driver_error)?;
        doc.map(Recipe::try_from).transpose().map_err(Into::into)
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RepositoryError> {
        self.recipes
            .replace_one(
                doc! { "_id": recipe.id.to_string() },
                RecipeDocument::from(recipe),
            )
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RepositoryError> {
        self.recipes
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn list(&self, query: &RecipeQuery) -> Result<RecipePage, RepositoryError> {
        let filter = recipe_filter(query);
        let total = self
            .recipes
            .count_documents(filter.clone())
            .await
            .map_err(driver_error)?;
        let skip = query.page.saturating_sub(1).saturating_mul(query.limit);
        let docs: Vec<RecipeDocument> = self
            .recipes
            .find(filter)
            .sort(sort_document(query.sort))
            .skip(skip)
            .limit(query.limit as i64)
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        let recipes = docs
            .into_iter()
            .map(|doc| Recipe::try_from(doc).map_err(Into::into))
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        Ok(RecipePage { recipes, total })
    }

    async fn list_by_category(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let docs: Vec<RecipeDocument> = self
            .recipes
            .find(doc! { "category": category.to_string() })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Recipe::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Recipe>, RepositoryError> {
        let docs: Vec<RecipeDocument> = self
            .recipes
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Recipe::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.recipes
            .count_documents(doc! {})
            .await
            .map_err(driver_error)
    }
}

#[async_trait]
impl ReviewsRepository for MongoStore {
    async fn insert(&self, review: Review) -> Result<(), RepositoryError> {
        self.reviews
            .insert_one(ReviewDocument::from(&review))
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        let doc = self
            .reviews
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        doc.map(Review::try_from).transpose().map_err(Into::into)
    }

    async fn find_by_recipe_and_user(
        &self,
        recipe: &RecipeId,
        user: &UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let doc = self
            .reviews
            .find_one(doc! { "recipe": recipe.to_string(), "user": user.to_string() })
            .await
            .map_err(driver_error)?;
        doc.map(Review::try_from).transpose().map_err(Into::into)
    }

    async fn update(&self, review: &Review) -> Result<(), RepositoryError> {
        self.reviews
            .replace_one(
                doc! { "_id": review.id.to_string() },
                ReviewDocument::from(review),
            )
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn delete(&self, id: &ReviewId) -> Result<(), RepositoryError> {
        self.reviews
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn delete_by_recipe(&self, recipe: &RecipeId) -> Result<(), RepositoryError> {
        self.reviews
            .delete_many(doc! { "recipe": recipe.to_string() })
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn list_by_recipe(&self, recipe: &RecipeId) -> Result<Vec<Review>, RepositoryError> {
        let docs: Vec<ReviewDocument> = self
            .reviews
            .find(doc! { "recipe": recipe.to_string() })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Review::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Review>, RepositoryError> {
        let docs: Vec<ReviewDocument> = self
            .reviews
            .find(doc! { "user": user.to_string() })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Review::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let docs: Vec<ReviewDocument> = self
            .reviews
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Review::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Review>, RepositoryError> {
        let docs: Vec<ReviewDocument> = self
            .reviews
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .await
            .map_err(driver_error)?
            .try_collect()
            .await
            .map_err(driver_error)?;
        docs.into_iter()
            .map(|doc| Review::try_from(doc).map_err(Into::into))
            .collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.reviews
            .count_documents(doc! {})
            .await
            .map_err(driver_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_filter_combines_criteria() {
        let query = RecipeQuery {
            category: Some(CategoryId::generate()),
            difficulty: Some(crate::domain::Difficulty::Easy),
            search: Some("soup".to_owned()),
            ..RecipeQuery::default()
        };
        let filter = recipe_filter(&query);
        assert!(filter.contains_key("category"));
        assert_eq!(filter.get_str("difficulty").expect("difficulty"), "easy");
        assert!(filter.contains_key("$or"));
    }

    #[test]
    fn sort_documents_use_expected_directions() {
        assert_eq!(
            sort_document(RecipeSort::CreatedAtDesc),
            doc! { "created_at": -1 }
        );
        assert_eq!(sort_document(RecipeSort::TitleAsc), doc! { "title": 1 });
    }
}
