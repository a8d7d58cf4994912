//! Registration, login, and the current-user endpoint.
//!
//! ```text
//! POST /api/auth/register
//! POST /api/auth/login
//! GET  /api/auth/me
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::{hash_password, verify_password};
use crate::domain::{Error, Role, User};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::require_text;
use crate::inbound::http::ApiResult;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token plus profile payload returned by registration and login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

fn normalise_email(raw: String) -> Result<String, Error> {
    let email = raw.trim().to_lowercase();
    if !email.contains('@') {
        return Err(Error::invalid_request("email is not valid").with_details(json!({
            "field": "email",
            "code": "invalid_email",
        })));
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<(), Error> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ))
        .with_details(json!({
            "field": "password",
            "code": "password_too_short",
        })));
    }
    Ok(())
}

/// Create an account and sign the caller in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let name = require_text(payload.name, "name")?;
    let email = normalise_email(require_text(payload.email, "email")?)?;
    let password = require_text(payload.password, "password")?;
    check_password(&password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(Error::conflict("Email is already registered"));
    }

    let user = User::new(name, email, hash_password(&password)?, Role::User);
    state.users.insert(user.clone()).await?;
    let token = state.tokens.issue(&user.id)?;
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = normalise_email(require_text(payload.email, "email")?)?;
    let password = require_text(payload.password, "password")?;

    // A missing account and a wrong password produce the same response so
    // the endpoint does not leak which emails are registered.
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(Error::unauthorized("invalid credentials"));
    }

    let token = state.tokens.issue(&user.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Fetch the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"]
)]
#[get("/me")]
pub async fn me(state: web::Data<HttpState>, token: BearerToken) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Ada@Example.COM", "ada@example.com")]
    #[case("  chef@site.org  ", "chef@site.org")]
    fn emails_are_trimmed_and_lowercased(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_email(raw.to_owned()).expect("valid"), expected);
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("plain")]
    fn invalid_emails_are_rejected(#[case] raw: &str) {
        assert!(normalise_email(raw.to_owned()).is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
    }
}
