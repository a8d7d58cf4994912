//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the specification for the REST API: every endpoint
//! from the inbound layer, the request and response schemas, and the bearer
//! token security scheme.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Difficulty, Error, ErrorCode, Role};
use crate::inbound::http::admin::{
    ChangeRoleRequest, RecipeStats, ReviewStats, StatsResponse, UserStats,
};
use crate::inbound::http::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::categories::{
    CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::inbound::http::favorites::FavoriteStatusResponse;
use crate::inbound::http::recipes::{
    CreateRecipeRequest, RecipeDetailResponse, RecipePageResponse, RecipeResponse,
    UpdateRecipeRequest,
};
use crate::inbound::http::reviews::{
    CreateReviewRequest, ReviewBody, ReviewResponse, UpdateReviewRequest,
};
use crate::inbound::http::uploads::UploadedFile;
use crate::inbound::http::users::{UpdateProfileRequest, UserResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/auth/register or POST /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tastebook API",
        description = "HTTP interface for the recipe-sharing backend."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::me,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe_by_id,
        crate::inbound::http::recipes::get_recipe_by_slug,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::create_recipe_review,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::list_recipe_reviews,
        crate::inbound::http::reviews::list_own_reviews,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::categories::list_category_recipes,
        crate::inbound::http::favorites::list_favorites,
        crate::inbound::http::favorites::favorite_status,
        crate::inbound::http::favorites::add_favorite,
        crate::inbound::http::favorites::remove_favorite,
        crate::inbound::http::uploads::upload_image,
        crate::inbound::http::uploads::upload_images,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::change_role,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::admin::stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Difficulty,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        UpdateProfileRequest,
        CreateRecipeRequest,
        UpdateRecipeRequest,
        RecipeResponse,
        RecipePageResponse,
        RecipeDetailResponse,
        CreateReviewRequest,
        UpdateReviewRequest,
        ReviewBody,
        ReviewResponse,
        CreateCategoryRequest,
        UpdateCategoryRequest,
        CategoryResponse,
        FavoriteStatusResponse,
        UploadedFile,
        ChangeRoleRequest,
        StatsResponse,
        UserStats,
        RecipeStats,
        ReviewStats,
    )),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "users", description = "User profiles"),
        (name = "recipes", description = "Recipe publishing and browsing"),
        (name = "reviews", description = "Recipe reviews"),
        (name = "categories", description = "Recipe categories"),
        (name = "favorites", description = "Per-user favorites"),
        (name = "uploads", description = "Image uploads"),
        (name = "admin", description = "Administration"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
