//! Favorites HTTP handlers. All routes require a signed-in user.
//!
//! ```text
//! GET    /api/favorites
//! GET    /api/favorites/{recipeId}
//! POST   /api/favorites/{recipeId}
//! DELETE /api/favorites/{recipeId}
//! ```
//!
//! The favorites list lives on the user; `favorites_count` on the recipe
//! mirrors it. Deleted recipes may leave dangling entries behind, which the
//! listing silently skips.

use actix_web::{delete, get, post, web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::user::FavoriteError;
use crate::domain::{Error, RecipeId};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::recipes::{parse_recipe_id, RecipeResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatusResponse {
    pub is_favorite: bool,
}

async fn bump_favorites_count(
    state: &HttpState,
    recipe_id: &RecipeId,
    delta: i64,
) -> Result<(), Error> {
    let Some(mut recipe) = state.recipes.find_by_id(recipe_id).await? else {
        return Ok(());
    };
    recipe.favorites_count = if delta >= 0 {
        recipe.favorites_count.saturating_add(delta as u64)
    } else {
        recipe.favorites_count.saturating_sub(delta.unsigned_abs())
    };
    recipe.updated_at = chrono::Utc::now();
    state.recipes.update(&recipe).await?;
    Ok(())
}

/// List the caller's favorite recipes.
#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "Favorite recipes", body = [RecipeResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["favorites"]
)]
#[get("")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let mut recipes = Vec::with_capacity(user.favorites.len());
    for recipe_id in &user.favorites {
        if let Some(recipe) = state.recipes.find_by_id(recipe_id).await? {
            recipes.push(RecipeResponse::from(&recipe));
        }
    }
    Ok(HttpResponse::Ok().json(recipes))
}

/// Check whether a recipe is in the caller's favorites.
#[utoipa::path(
    get,
    path = "/api/favorites/{recipeId}",
    params(("recipeId" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Favorite status", body = FavoriteStatusResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["favorites"]
)]
#[get("/{recipeId}")]
pub async fn favorite_status(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let recipe_id = parse_recipe_id(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(FavoriteStatusResponse {
        is_favorite: user.has_favorite(&recipe_id),
    }))
}

/// Add a recipe to the caller's favorites.
#[utoipa::path(
    post,
    path = "/api/favorites/{recipeId}",
    params(("recipeId" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe favorited"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Already favorited", body = Error)
    ),
    tags = ["favorites"]
)]
#[post("/{recipeId}")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let mut user = authenticate(&state, &token).await?;
    let recipe_id = parse_recipe_id(&path.into_inner())?;
    if state.recipes.find_by_id(&recipe_id).await?.is_none() {
        return Err(Error::not_found("Recipe not found"));
    }
    user.add_favorite(recipe_id)
        .map_err(|_: FavoriteError| Error::conflict("Recipe is already in favorites"))?;
    user.updated_at = chrono::Utc::now();
    state.users.update(&user).await?;
    bump_favorites_count(&state, &recipe_id, 1).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Recipe added to favorites" })))
}

/// Remove a recipe from the caller's favorites.
#[utoipa::path(
    delete,
    path = "/api/favorites/{recipeId}",
    params(("recipeId" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe unfavorited"),
        (status = 400, description = "Not in favorites", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["favorites"]
)]
#[delete("/{recipeId}")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let mut user = authenticate(&state, &token).await?;
    let recipe_id = parse_recipe_id(&path.into_inner())?;
    user.remove_favorite(&recipe_id)
        .map_err(|_: FavoriteError| Error::invalid_request("Recipe is not in favorites"))?;
    user.updated_at = chrono::Utc::now();
    state.users.update(&user).await?;
    bump_favorites_count(&state, &recipe_id, -1).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Recipe removed from favorites" })))
}
