//! Admin HTTP handlers. Every route requires the admin role.
//!
//! ```text
//! GET    /api/admin/users
//! PUT    /api/admin/users/{id}/role
//! DELETE /api/admin/users/{id}
//! GET    /api/admin/stats
//! ```

use actix_web::{delete, get, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::ensure_admin;
use crate::domain::{Error, Role};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::recipes::RecipeResponse;
use crate::inbound::http::reviews::ReviewResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{parse_user_id, UserResponse};
use crate::inbound::http::validation::require_text;
use crate::inbound::http::ApiResult;

/// Number of recent items included in the stats payload.
const RECENT_LIMIT: usize = 3;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub admins: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStats {
    pub total: u64,
    pub recent: Vec<RecipeResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total: u64,
    pub recent: Vec<ReviewResponse>,
}

/// Site-wide totals plus the most recent recipes and reviews.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: UserStats,
    pub recipes: RecipeStats,
    pub reviews: ReviewStats,
}

/// List every account, oldest first.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["admin"]
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    let caller = authenticate(&state, &token).await?;
    ensure_admin(&caller)?;
    let users = state.users.list().await?;
    let body: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Change an account's role.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = String, Path, description = "User identifier")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid role", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"]
)]
#[put("/users/{id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
    payload: web::Json<ChangeRoleRequest>,
) -> ApiResult<HttpResponse> {
    let caller = authenticate(&state, &token).await?;
    ensure_admin(&caller)?;

    let id = parse_user_id(&path.into_inner())?;
    let raw_role = require_text(payload.into_inner().role, "role")?;
    let role = raw_role.parse::<Role>().map_err(|_| {
        Error::invalid_request("Invalid role").with_details(json!({
            "field": "role",
            "value": raw_role,
            "code": "invalid_role",
        }))
    })?;

    let mut user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;
    user.role = role;
    user.updated_at = chrono::Utc::now();
    state.users.update(&user).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// Delete an account. Admins cannot delete their own account, so the
/// system never loses its last administrator to a stray click.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Cannot delete own account", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"]
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = authenticate(&state, &token).await?;
    ensure_admin(&caller)?;

    let id = parse_user_id(&path.into_inner())?;
    if id == caller.id {
        return Err(Error::invalid_request("You cannot delete your own account"));
    }
    if state.users.find_by_id(&id).await?.is_none() {
        return Err(Error::not_found("User not found"));
    }
    state.users.delete(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

/// Site-wide statistics.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Totals and recent activity", body = StatsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["admin"]
)]
#[get("/stats")]
pub async fn stats(state: web::Data<HttpState>, token: BearerToken) -> ApiResult<HttpResponse> {
    let caller = authenticate(&state, &token).await?;
    ensure_admin(&caller)?;

    let recent_recipes = state.recipes.recent(RECENT_LIMIT).await?;
    let recent_reviews = state.reviews.recent(RECENT_LIMIT).await?;
    let body = StatsResponse {
        users: UserStats {
            total: state.users.count().await?,
            admins: state.users.count_by_role(Role::Admin).await?,
        },
        recipes: RecipeStats {
            total: state.recipes.count().await?,
            recent: recent_recipes.iter().map(RecipeResponse::from).collect(),
        },
        reviews: ReviewStats {
            total: state.reviews.count().await?,
            recent: recent_reviews.iter().map(ReviewResponse::from).collect(),
        },
    };
    Ok(HttpResponse::Ok().json(body))
}
