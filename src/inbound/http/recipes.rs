//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/recipes
//! POST   /api/recipes
//! GET    /api/recipes/id/{id}
//! GET    /api/recipes/{slug}
//! PUT    /api/recipes/{id}
//! DELETE /api/recipes/{id}
//! POST   /api/recipes/{id}/reviews
//! ```
//!
//! Slugs are derived from titles, never accepted from clients, and are
//! unique across the collection. A title whose slug collides with another
//! recipe is a conflict rather than a silent suffix.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::auth::ensure_owner_or_admin;
use crate::domain::ports::{RecipeQuery, RecipeSort};
use crate::domain::recipe::NewRecipe;
use crate::domain::{slugify, Category, CategoryId, Difficulty, Error, Recipe, RecipeId};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::reviews::{self, ReviewBody, ReviewResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_id_error, missing_field_error, require_text};
use crate::inbound::http::ApiResult;

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub difficulty: Difficulty,
    pub category: String,
    pub author: String,
    pub rating: f64,
    pub review_count: u64,
    pub favorites_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Recipe> for RecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            title: recipe.title.clone(),
            slug: recipe.slug.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            difficulty: recipe.difficulty,
            category: recipe.category.to_string(),
            author: recipe.author.to_string(),
            rating: recipe.rating,
            review_count: recipe.review_count,
            favorites_count: recipe.favorites_count,
            image: recipe.image.clone(),
            created_at: recipe.created_at.to_rfc3339(),
            updated_at: recipe.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// Query parameters accepted by the recipe listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListRecipesQuery {
    /// Filter by category identifier.
    pub category: Option<String>,
    /// Filter by difficulty bucket.
    pub difficulty: Option<String>,
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
    /// Sort field, prefixed with `-` for descending order.
    pub sort: Option<String>,
    /// One-based page number.
    pub page: Option<u64>,
    /// Page size, at most 100.
    pub limit: Option<u64>,
}

/// Paginated recipe listing envelope.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipePageResponse {
    pub recipes: Vec<RecipeResponse>,
    pub total: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

/// Recipe detail: the recipe together with its reviews, newest first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailResponse {
    pub recipe: RecipeResponse,
    pub reviews: Vec<ReviewResponse>,
}

pub(crate) fn parse_recipe_id(raw: &str) -> Result<RecipeId, Error> {
    RecipeId::parse(raw).map_err(|_| invalid_id_error("recipeId", raw))
}

fn parse_category_id(raw: &str) -> Result<CategoryId, Error> {
    CategoryId::parse(raw).map_err(|_| invalid_id_error("category", raw))
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, Error> {
    raw.parse::<Difficulty>().map_err(|_| {
        Error::invalid_request("difficulty must be easy, medium, or hard").with_details(json!({
            "field": "difficulty",
            "value": raw,
            "code": "invalid_difficulty",
        }))
    })
}

fn derive_slug(title: &str) -> Result<String, Error> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(Error::invalid_request(
            "title must contain at least one alphanumeric character",
        )
        .with_details(json!({ "field": "title", "code": "unsluggable_title" })));
    }
    Ok(slug)
}

fn build_query(params: ListRecipesQuery) -> Result<RecipeQuery, Error> {
    let mut query = RecipeQuery::default();
    if let Some(category) = params.category {
        query.category = Some(parse_category_id(&category)?);
    }
    if let Some(difficulty) = params.difficulty {
        query.difficulty = Some(parse_difficulty(&difficulty)?);
    }
    if let Some(search) = params.search {
        let search = search.trim().to_owned();
        if !search.is_empty() {
            query.search = Some(search);
        }
    }
    if let Some(sort) = params.sort {
        query.sort = RecipeSort::parse(&sort).ok_or_else(|| {
            Error::invalid_request("unknown sort field").with_details(json!({
                "field": "sort",
                "value": sort,
                "code": "invalid_sort",
            }))
        })?;
    }
    if let Some(page) = params.page {
        if page == 0 {
            return Err(Error::invalid_request("page must be at least 1")
                .with_details(json!({ "field": "page", "code": "invalid_page" })));
        }
        query.page = page;
    }
    if let Some(limit) = params.limit {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(Error::invalid_request(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            ))
            .with_details(json!({ "field": "limit", "code": "invalid_limit" })));
        }
        query.limit = limit;
    }
    Ok(query)
}

async fn adjust_category_count(
    state: &HttpState,
    category: &CategoryId,
    delta: i64,
) -> Result<(), Error> {
    // Categories may have been deleted out from under their recipes;
    // the count adjustment is then a no-op.
    let Some(mut category) = state.categories.find_by_id(category).await? else {
        return Ok(());
    };
    category.recipe_count = if delta >= 0 {
        category.recipe_count.saturating_add(delta as u64)
    } else {
        category.recipe_count.saturating_sub(delta.unsigned_abs())
    };
    category.updated_at = chrono::Utc::now();
    state.categories.update(&category).await?;
    Ok(())
}

async fn require_category(state: &HttpState, id: &CategoryId) -> Result<Category, Error> {
    state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))
}

/// List recipes with filtering, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(ListRecipesQuery),
    responses(
        (status = 200, description = "A page of recipes", body = RecipePageResponse),
        (status = 400, description = "Invalid query parameters", body = Error)
    ),
    tags = ["recipes"],
    security([])
)]
#[get("")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    params: web::Query<ListRecipesQuery>,
) -> ApiResult<HttpResponse> {
    let query = build_query(params.into_inner())?;
    let page = state.recipes.list(&query).await?;
    let body = RecipePageResponse {
        recipes: page.recipes.iter().map(RecipeResponse::from).collect(),
        total: page.total,
        current_page: query.page,
        total_pages: page.total.div_ceil(query.limit),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Publish a recipe authored by the caller.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Category not found", body = Error),
        (status = 409, description = "Title collides with an existing recipe", body = Error)
    ),
    tags = ["recipes"]
)]
#[post("")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    token: BearerToken,
    payload: web::Json<CreateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let payload = payload.into_inner();

    let title = require_text(payload.title, "title")?;
    let slug = derive_slug(&title)?;
    let description = require_text(payload.description, "description")?;
    let ingredients = payload
        .ingredients
        .filter(|items| !items.is_empty())
        .ok_or_else(|| missing_field_error("ingredients"))?;
    let steps = payload
        .steps
        .filter(|items| !items.is_empty())
        .ok_or_else(|| missing_field_error("steps"))?;
    let difficulty = parse_difficulty(&require_text(payload.difficulty, "difficulty")?)?;
    let category_id = parse_category_id(&require_text(payload.category, "category")?)?;

    require_category(&state, &category_id).await?;
    if state.recipes.find_by_slug(&slug).await?.is_some() {
        return Err(Error::conflict("Recipe with this title already exists"));
    }

    let recipe = Recipe::new(NewRecipe {
        title,
        slug,
        description,
        ingredients,
        steps,
        difficulty,
        category: category_id,
        author: user.id,
        image: payload.image,
    });
    state.recipes.insert(recipe.clone()).await?;
    adjust_category_count(&state, &recipe.category, 1).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(&recipe)))
}

/// Fetch a recipe by identifier.
#[utoipa::path(
    get,
    path = "/api/recipes/id/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "The recipe", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"],
    security([])
)]
#[get("/id/{id}")]
pub async fn get_recipe_by_id(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_recipe_id(&path.into_inner())?;
    let recipe = state
        .recipes
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Recipe not found"))?;
    Ok(HttpResponse::Ok().json(RecipeResponse::from(&recipe)))
}

/// Fetch a recipe by slug, together with its reviews.
#[utoipa::path(
    get,
    path = "/api/recipes/{slug}",
    params(("slug" = String, Path, description = "Recipe slug")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetailResponse),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"],
    security([])
)]
#[get("/{slug}")]
pub async fn get_recipe_by_slug(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let recipe = state
        .recipes
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found("Recipe not found"))?;
    let reviews = state.reviews.list_by_recipe(&recipe.id).await?;
    let body = RecipeDetailResponse {
        recipe: RecipeResponse::from(&recipe),
        reviews: reviews.iter().map(ReviewResponse::from).collect(),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Update a recipe. Only its author or an admin may do so.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Recipe or category not found", body = Error),
        (status = 409, description = "Title collides with an existing recipe", body = Error)
    ),
    tags = ["recipes"]
)]
#[put("/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
    payload: web::Json<UpdateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let id = parse_recipe_id(&path.into_inner())?;
    let mut recipe = state
        .recipes
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Recipe not found"))?;
    ensure_owner_or_admin(&recipe.author, &user)?;

    let payload = payload.into_inner();
    if let Some(title) = payload.title {
        let title = require_text(Some(title), "title")?;
        let slug = derive_slug(&title)?;
        if slug != recipe.slug {
            if state.recipes.find_by_slug(&slug).await?.is_some() {
                return Err(Error::conflict("Recipe with this title already exists"));
            }
            recipe.slug = slug;
        }
        recipe.title = title;
    }
    if let Some(description) = payload.description {
        recipe.description = require_text(Some(description), "description")?;
    }
    if let Some(ingredients) = payload.ingredients {
        if ingredients.is_empty() {
            return Err(missing_field_error("ingredients"));
        }
        recipe.ingredients = ingredients;
    }
    if let Some(steps) = payload.steps {
        if steps.is_empty() {
            return Err(missing_field_error("steps"));
        }
        recipe.steps = steps;
    }
    if let Some(difficulty) = payload.difficulty {
        recipe.difficulty = parse_difficulty(&difficulty)?;
    }
    if let Some(category) = payload.category {
        let category_id = parse_category_id(&category)?;
        if category_id != recipe.category {
            require_category(&state, &category_id).await?;
            adjust_category_count(&state, &recipe.category, -1).await?;
            adjust_category_count(&state, &category_id, 1).await?;
            recipe.category = category_id;
        }
    }
    if let Some(image) = payload.image {
        recipe.image = Some(image);
    }
    recipe.updated_at = chrono::Utc::now();
    state.recipes.update(&recipe).await?;
    Ok(HttpResponse::Ok().json(RecipeResponse::from(&recipe)))
}

/// Delete a recipe and its reviews. Only the author or an admin may do so.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"]
)]
#[delete("/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let id = parse_recipe_id(&path.into_inner())?;
    let recipe = state
        .recipes
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Recipe not found"))?;
    ensure_owner_or_admin(&recipe.author, &user)?;

    state.reviews.delete_by_recipe(&id).await?;
    state.recipes.delete(&id).await?;
    adjust_category_count(&state, &recipe.category, -1).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Recipe deleted successfully" })))
}

/// Create a review on a recipe named in the path.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/reviews",
    params(("id" = String, Path, description = "Recipe identifier")),
    request_body = ReviewBody,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Already reviewed", body = Error)
    ),
    tags = ["reviews"]
)]
#[post("/{id}/reviews")]
pub async fn create_recipe_review(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let recipe_id = parse_recipe_id(&path.into_inner())?;
    let review = reviews::submit_review(&state, &user, recipe_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(&review)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn build_query_applies_defaults() {
        let query = build_query(ListRecipesQuery::default()).expect("valid");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort, RecipeSort::CreatedAtDesc);
    }

    #[test]
    fn build_query_rejects_bad_pagination() {
        let err = build_query(ListRecipesQuery {
            page: Some(0),
            ..ListRecipesQuery::default()
        })
        .expect_err("page 0");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        assert!(build_query(ListRecipesQuery {
            limit: Some(0),
            ..ListRecipesQuery::default()
        })
        .is_err());
        assert!(build_query(ListRecipesQuery {
            limit: Some(101),
            ..ListRecipesQuery::default()
        })
        .is_err());
    }

    #[test]
    fn build_query_rejects_unknown_sort() {
        let err = build_query(ListRecipesQuery {
            sort: Some("views".to_owned()),
            ..ListRecipesQuery::default()
        })
        .expect_err("unknown sort");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn unsluggable_titles_are_rejected() {
        assert!(derive_slug("!!!").is_err());
        assert_eq!(derive_slug("Tomato Soup!!").expect("valid"), "tomato-soup");
    }
}
