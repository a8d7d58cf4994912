//! Review HTTP handlers and the recipe rating refresh.
//!
//! ```text
//! GET    /api/reviews             (admin)
//! GET    /api/reviews/recipe/{recipeId}
//! GET    /api/reviews/user
//! GET    /api/reviews/{id}
//! POST   /api/reviews
//! PUT    /api/reviews/{id}
//! DELETE /api/reviews/{id}
//! ```
//!
//! Every mutation recomputes the owning recipe's aggregate rating from the
//! full review set rather than adjusting it incrementally, so the stored
//! aggregate can never drift from the reviews themselves.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::{ensure_admin, ensure_owner_or_admin};
use crate::domain::{Error, Rating, RatingSummary, RecipeId, Review, ReviewId, User};
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::recipes::parse_recipe_id;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_id_error, missing_field_error, require_text};
use crate::inbound::http::ApiResult;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub recipe: String,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Review> for ReviewResponse {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            recipe: review.recipe.to_string(),
            user: review.user.to_string(),
            rating: review.rating.value(),
            comment: review.comment.clone(),
            created_at: review.created_at.to_rfc3339(),
            updated_at: review.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub recipe_id: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Payload accepted by both the standalone and the nested creation routes.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

pub(crate) fn parse_review_id(raw: &str) -> Result<ReviewId, Error> {
    ReviewId::parse(raw).map_err(|_| invalid_id_error("reviewId", raw))
}

fn parse_rating(raw: Option<u8>) -> Result<Rating, Error> {
    let raw = raw.ok_or_else(|| missing_field_error("rating"))?;
    Rating::new(raw).map_err(|_| {
        Error::invalid_request("rating must be between 1 and 5").with_details(json!({
            "field": "rating",
            "value": raw,
            "code": "rating_out_of_range",
        }))
    })
}

/// Recompute a recipe's aggregate rating from its current review set.
pub(crate) async fn refresh_recipe_rating(
    state: &HttpState,
    recipe_id: &RecipeId,
) -> Result<(), Error> {
    let Some(mut recipe) = state.recipes.find_by_id(recipe_id).await? else {
        // The recipe may have been deleted concurrently; nothing to update.
        return Ok(());
    };
    let reviews = state.reviews.list_by_recipe(recipe_id).await?;
    let summary = RatingSummary::from_ratings(reviews.iter().map(|review| review.rating));
    recipe.apply_rating(summary);
    state.recipes.update(&recipe).await?;
    Ok(())
}

/// Create a review on behalf of `author`, enforcing the one-review-per-user
/// rule and refreshing the recipe's aggregate.
pub(crate) async fn submit_review(
    state: &HttpState,
    author: &User,
    recipe_id: RecipeId,
    body: ReviewBody,
) -> Result<Review, Error> {
    let rating = parse_rating(body.rating)?;
    let comment = require_text(body.comment, "comment")?;

    if state.recipes.find_by_id(&recipe_id).await?.is_none() {
        return Err(Error::not_found("Recipe not found"));
    }
    if state
        .reviews
        .find_by_recipe_and_user(&recipe_id, &author.id)
        .await?
        .is_some()
    {
        return Err(Error::conflict("You have already reviewed this recipe"));
    }

    let review = Review::new(recipe_id, author.id, rating, comment);
    state.reviews.insert(review.clone()).await?;
    refresh_recipe_rating(state, &review.recipe).await?;
    Ok(review)
}

/// List every review in the system. Admin only.
#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "All reviews, newest first", body = [ReviewResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["reviews"]
)]
#[get("")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    ensure_admin(&user)?;
    let reviews = state.reviews.list_all().await?;
    let body: Vec<ReviewResponse> = reviews.iter().map(ReviewResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// List the reviews on a recipe.
#[utoipa::path(
    get,
    path = "/api/reviews/recipe/{recipeId}",
    params(("recipeId" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewResponse]),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["reviews"],
    security([])
)]
#[get("/recipe/{recipeId}")]
pub async fn list_recipe_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let recipe_id = parse_recipe_id(&path.into_inner())?;
    if state.recipes.find_by_id(&recipe_id).await?.is_none() {
        return Err(Error::not_found("Recipe not found"));
    }
    let reviews = state.reviews.list_by_recipe(&recipe_id).await?;
    let body: Vec<ReviewResponse> = reviews.iter().map(ReviewResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// List the authenticated user's own reviews.
#[utoipa::path(
    get,
    path = "/api/reviews/user",
    responses(
        (status = 200, description = "Own reviews, newest first", body = [ReviewResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reviews"]
)]
#[get("/user")]
pub async fn list_own_reviews(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let reviews = state.reviews.list_by_user(&user.id).await?;
    let body: Vec<ReviewResponse> = reviews.iter().map(ReviewResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a single review.
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "The review", body = ReviewResponse),
        (status = 404, description = "Review not found", body = Error)
    ),
    tags = ["reviews"],
    security([])
)]
#[get("/{id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_review_id(&path.into_inner())?;
    let review = state
        .reviews
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Review not found"))?;
    Ok(HttpResponse::Ok().json(ReviewResponse::from(&review)))
}

/// Create a review for a recipe named in the payload.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Already reviewed", body = Error)
    ),
    tags = ["reviews"]
)]
#[post("")]
pub async fn create_review(
    state: web::Data<HttpState>,
    token: BearerToken,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let payload = payload.into_inner();
    let recipe_id = parse_recipe_id(&require_text(payload.recipe_id, "recipeId")?)?;
    let review = submit_review(
        &state,
        &user,
        recipe_id,
        ReviewBody {
            rating: payload.rating,
            comment: payload.comment,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(&review)))
}

/// Update a review. Only its author or an admin may do so.
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Review not found", body = Error)
    ),
    tags = ["reviews"]
)]
#[put("/{id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let id = parse_review_id(&path.into_inner())?;
    let mut review = state
        .reviews
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Review not found"))?;
    ensure_owner_or_admin(&review.user, &user)?;

    let payload = payload.into_inner();
    if payload.rating.is_some() {
        review.rating = parse_rating(payload.rating)?;
    }
    if let Some(comment) = payload.comment {
        review.comment = require_text(Some(comment), "comment")?;
    }
    review.updated_at = chrono::Utc::now();
    state.reviews.update(&review).await?;
    refresh_recipe_rating(&state, &review.recipe).await?;
    Ok(HttpResponse::Ok().json(ReviewResponse::from(&review)))
}

/// Delete a review. Only its author or an admin may do so.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Review not found", body = Error)
    ),
    tags = ["reviews"]
)]
#[delete("/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    token: BearerToken,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state, &token).await?;
    let id = parse_review_id(&path.into_inner())?;
    let review = state
        .reviews
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Review not found"))?;
    ensure_owner_or_admin(&review.user, &user)?;

    state.reviews.delete(&id).await?;
    refresh_recipe_rating(&state, &review.recipe).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" })))
}
