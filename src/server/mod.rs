//! Server construction and route wiring.

mod config;

pub use config::{AdminBootstrap, ServerConfig};

use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{get, web, App, HttpResponse, HttpServer};
use serde_json::json;
use tracing::info;

use crate::domain::auth::hash_password;
use crate::domain::ports::UsersRepository;
use crate::domain::{Error, Role, User};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{admin, auth, categories, favorites, recipes, reviews, uploads, users};
use crate::middleware::Trace;

/// API index: a small welcome payload pointing at the interesting routes.
#[get("/")]
async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "tastebook",
        "message": "Recipe sharing API",
        "api": "/api",
    }))
}

/// Assemble the application with every route and middleware attached.
///
/// Route registration order matters where literal and parameterised
/// segments overlap: `/recipes/id/{id}` and `/reviews/recipe/{recipeId}`
/// must land before their single-segment `{slug}` / `{id}` siblings.
pub fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let uploads_dir = http_state.uploads.dir.clone();

    let api = web::scope("/api")
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me),
        )
        .service(
            web::scope("/users")
                .service(users::get_profile)
                .service(users::update_profile)
                .service(users::get_user),
        )
        .service(
            web::scope("/recipes")
                .service(recipes::list_recipes)
                .service(recipes::create_recipe)
                .service(recipes::get_recipe_by_id)
                .service(recipes::create_recipe_review)
                .service(recipes::update_recipe)
                .service(recipes::delete_recipe)
                .service(recipes::get_recipe_by_slug),
        )
        .service(
            web::scope("/reviews")
                .service(reviews::list_reviews)
                .service(reviews::create_review)
                .service(reviews::list_recipe_reviews)
                .service(reviews::list_own_reviews)
                .service(reviews::get_review)
                .service(reviews::update_review)
                .service(reviews::delete_review),
        )
        .service(
            web::scope("/categories")
                .service(categories::list_categories)
                .service(categories::create_category)
                .service(categories::list_category_recipes)
                .service(categories::get_category)
                .service(categories::update_category)
                .service(categories::delete_category),
        )
        .service(
            web::scope("/favorites")
                .service(favorites::list_favorites)
                .service(favorites::favorite_status)
                .service(favorites::add_favorite)
                .service(favorites::remove_favorite),
        )
        .service(
            web::scope("/uploads")
                .service(uploads::upload_image)
                .service(uploads::upload_images),
        )
        .service(
            web::scope("/admin")
                .service(admin::list_users)
                .service(admin::change_role)
                .service(admin::delete_user)
                .service(admin::stats),
        );

    App::new()
        .app_data(http_state)
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(Files::new("/uploads", uploads_dir))
        .service(index)
        .service(ready)
        .service(live)
}

/// Create the bootstrap admin account when it does not already exist.
pub async fn ensure_admin_user(
    users: &Arc<dyn UsersRepository>,
    bootstrap: &AdminBootstrap,
) -> Result<(), Error> {
    if let Some(existing) = users.find_by_email(&bootstrap.email).await? {
        if !existing.is_admin() {
            return Err(Error::conflict(
                "bootstrap admin email belongs to a non-admin account",
            ));
        }
        return Ok(());
    }
    let user = User::new(
        bootstrap.name.clone(),
        bootstrap.email.clone(),
        hash_password(&bootstrap.password)?,
        Role::Admin,
    );
    info!(email = %user.email, "created bootstrap admin account");
    users.insert(user).await?;
    Ok(())
}

/// Construct the HTTP server and mark the health state ready once the
/// listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    bind_addr: &str,
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> std::io::Result<Server> {
    let server_http_state = http_state.clone();
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_http_state.clone(), server_health_state.clone())
    })
    .bind(bind_addr)?
    .run();
    health_state.mark_ready();
    Ok(server)
}
