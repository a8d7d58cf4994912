//! User profile HTTP handlers.
//!
//! ```text
//! GET /api/users/me
//! GET /api/users/{id}
//! PUT /api/users/me
//! ```

use actix_web::{get, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, User, UserId};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{blank_field_error, invalid_id_error};
use crate::inbound::http::ApiResult;

/// Account representation returned by every endpoint; the password hash
/// never leaves the persistence layer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub favorites: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            avatar: user.avatar.clone(),
            favorites: user.favorites.iter().map(ToString::to_string).collect(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Payload for profile updates; absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::parse(raw).map_err(|_| invalid_id_error("userId", raw))
}

/// Fetch the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"]
)]
#[get("/me")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// Fetch a user's public profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    security([])
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// Update the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"]
)]
#[put("/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    token: BearerToken,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let mut user = authenticate(&state, &token).await?;
    let payload = payload.into_inner();
    if let Some(name) = payload.name {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(blank_field_error("name"));
        }
        user.name = name;
    }
    if let Some(avatar) = payload.avatar {
        user.avatar = Some(avatar);
    }
    user.updated_at = chrono::Utc::now();
    state.users.update(&user).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
