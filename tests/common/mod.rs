//! Shared fixtures for the HTTP integration suites.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};
use serde_json::{json, Value};
use tempfile::TempDir;

use tastebook::domain::ports::{CategoriesRepository, UsersRepository};
use tastebook::domain::{Category, Role};
use tastebook::inbound::http::health::HealthState;
use tastebook::inbound::http::identity::TokenCodec;
use tastebook::inbound::http::state::{HttpState, UploadConfig};
use tastebook::outbound::persistence::MemoryStore;

/// Everything a suite needs: handler state, the backing store for direct
/// setup, and the temporary uploads directory (dropped with the context).
pub struct TestContext {
    pub state: web::Data<HttpState>,
    pub health: web::Data<HealthState>,
    pub store: MemoryStore,
    pub uploads: TempDir,
}

pub fn test_context() -> TestContext {
    let store = MemoryStore::default();
    let uploads = TempDir::new().expect("create uploads dir");
    let state = HttpState {
        users: Arc::new(store.clone()),
        categories: Arc::new(store.clone()),
        recipes: Arc::new(store.clone()),
        reviews: Arc::new(store.clone()),
        tokens: TokenCodec::new("test-secret", 1),
        uploads: UploadConfig::new(uploads.path()),
    };
    TestContext {
        state: web::Data::new(state),
        health: web::Data::new(HealthState::new()),
        store,
        uploads,
    }
}

/// Register an account through the API, returning `(token, user_id)`.
pub async fn register_user<S>(app: &S, name: &str, email: &str) -> (String, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201, "registration must succeed");
    let body: Value = test::read_body_json(res).await;
    let token = body["token"].as_str().expect("token").to_owned();
    let user_id = body["user"]["id"].as_str().expect("user id").to_owned();
    (token, user_id)
}

/// Promote an account to admin directly in the store.
pub async fn promote_to_admin(store: &MemoryStore, email: &str) {
    let mut user = store
        .find_by_email(email)
        .await
        .expect("store read")
        .expect("account exists");
    user.role = Role::Admin;
    UsersRepository::update(store, &user)
        .await
        .expect("store write");
}

/// Seed a category directly in the store, returning its identifier.
pub async fn seed_category(store: &MemoryStore, name: &str) -> String {
    let category = Category::new(
        name.to_owned(),
        format!("{name} recipes"),
        "bowl".to_owned(),
        "#c0392b".to_owned(),
        "#fdeaea".to_owned(),
    );
    let id = category.id.to_string();
    CategoriesRepository::insert(store, category)
        .await
        .expect("store write");
    id
}

/// Bearer header tuple for authenticated requests.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Publish a recipe through the API, returning the response payload.
pub async fn create_recipe<S>(app: &S, token: &str, title: &str, category: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(bearer(token))
            .set_json(json!({
                "title": title,
                "description": "A cosy classic.",
                "ingredients": ["tomatoes", "stock"],
                "steps": ["chop", "simmer"],
                "difficulty": "easy",
                "category": category,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201, "recipe creation must succeed");
    test::read_body_json(res).await
}
