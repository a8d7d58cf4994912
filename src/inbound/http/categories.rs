//! Category HTTP handlers. Reads are public; mutations are admin only.
//!
//! ```text
//! GET    /api/categories
//! POST   /api/categories          (admin)
//! GET    /api/categories/{id}
//! PUT    /api/categories/{id}     (admin)
//! DELETE /api/categories/{id}     (admin)
//! GET    /api/categories/{slug}/recipes
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::ensure_admin;
use crate::domain::{slugify, Category, CategoryId, Error};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::recipes::RecipeResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_id_error, require_text};
use crate::inbound::http::ApiResult;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub recipe_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            bg_color: category.bg_color.clone(),
            recipe_count: category.recipe_count,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub bg_color: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub bg_color: Option<String>,
}

fn parse_category_id(raw: &str) -> Result<CategoryId, Error> {
    CategoryId::parse(raw).map_err(|_| invalid_id_error("categoryId", raw))
}

fn derive_slug(name: &str) -> Result<String, Error> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(Error::invalid_request(
            "name must contain at least one alphanumeric character",
        )
        .with_details(json!({ "field": "name", "code": "unsluggable_name" })));
    }
    Ok(slug)
}

async fn check_name_free(
    state: &HttpState,
    name: &str,
    slug: &str,
    exclude: Option<&CategoryId>,
) -> Result<(), Error> {
    let collides = |found: Option<Category>| {
        found.is_some_and(|existing| exclude != Some(&existing.id))
    };
    if collides(state.categories.find_by_name(name).await?)
        || collides(state.categories.find_by_slug(slug).await?)
    {
        return Err(Error::conflict("Category with this name already exists"));
    }
    Ok(())
}

/// List all categories, sorted by name.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = [CategoryResponse])),
    tags = ["categories"],
    security([])
)]
#[get("")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let categories = state.categories.list().await?;
    let body: Vec<CategoryResponse> = categories.iter().map(CategoryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Create a category. Admin only.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 409, description = "Name already in use", body = Error)
    ),
    tags = ["categories"]
)]
#[post("")]
pub async fn create_category(
    state: web::Data<HttpState>,
    token: BearerToken,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    ensure_admin(&user)?;

    let payload = payload.into_inner();
    let name = require_text(payload.name, "name")?;
    let slug = derive_slug(&name)?;
    check_name_free(&state, &name, &slug, None).await?;
    let category = Category::new(
        name,
        payload.description.unwrap_or_default(),
        payload.icon.unwrap_or_default(),
        payload.color.unwrap_or_default(),
        payload.bg_color.unwrap_or_default(),
    );
    state.categories.insert(category.clone()).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(&category)))
}

/// Fetch a single category.
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "Category not found", body = Error)
    ),
    tags = ["categories"],
    security([])
)]
#[get("/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_category_id(&path.into_inner())?;
    let category = state
        .categories
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(&category)))
}

/// Update a category. Admin only; renames re-derive the slug.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Category not found", body = Error),
        (status = 409, description = "Name already in use", body = Error)
    ),
    tags = ["categories"]
)]
#[put("/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
    payload: web::Json<UpdateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    ensure_admin(&user)?;

    let id = parse_category_id(&path.into_inner())?;
    let mut category = state
        .categories
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;

    let payload = payload.into_inner();
    if let Some(name) = payload.name {
        let name = require_text(Some(name), "name")?;
        if name != category.name {
            let slug = derive_slug(&name)?;
            check_name_free(&state, &name, &slug, Some(&category.id)).await?;
            category.rename(name);
        }
    }
    if let Some(description) = payload.description {
        category.description = description;
    }
    if let Some(icon) = payload.icon {
        category.icon = icon;
    }
    if let Some(color) = payload.color {
        category.color = color;
    }
    if let Some(bg_color) = payload.bg_color {
        category.bg_color = bg_color;
    }
    category.updated_at = chrono::Utc::now();
    state.categories.update(&category).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(&category)))
}

/// Delete a category. Admin only. Recipes keep their category reference;
/// listings by the removed category simply come up empty.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Category not found", body = Error)
    ),
    tags = ["categories"]
)]
#[delete("/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    ensure_admin(&user)?;

    let id = parse_category_id(&path.into_inner())?;
    if state.categories.find_by_id(&id).await?.is_none() {
        return Err(Error::not_found("Category not found"));
    }
    state.categories.delete(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Category deleted successfully" })))
}

/// List the recipes in a category, addressed by slug.
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/recipes",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Recipes in the category, newest first", body = [RecipeResponse]),
        (status = 404, description = "Category not found", body = Error)
    ),
    tags = ["categories"],
    security([])
)]
#[get("/{slug}/recipes")]
pub async fn list_category_recipes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found("Category not found"))?;
    let recipes = state.recipes.list_by_category(&category.id).await?;
    let body: Vec<RecipeResponse> = recipes.iter().map(RecipeResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
