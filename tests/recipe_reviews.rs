//! Recipe publishing, slug handling, and the review/rating lifecycle.

mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{bearer, create_recipe, register_user, seed_category, test_context};
use tastebook::server::build_app;

#[actix_web::test]
async fn titles_are_slugified_and_slugs_are_unique() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let category = seed_category(&ctx.store, "Soups").await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    let recipe = create_recipe(&app, &token, "Tomato Soup!!", &category).await;
    assert_eq!(recipe["slug"].as_str(), Some("tomato-soup"));
    assert_eq!(recipe["rating"].as_f64(), Some(0.0));
    assert_eq!(recipe["reviewCount"].as_u64(), Some(0));

    // "Tomato Soup" derives the same slug as "Tomato Soup!!".
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "Tomato Soup",
                "description": "Another one.",
                "ingredients": ["tomatoes"],
                "steps": ["simmer"],
                "difficulty": "easy",
                "category": category,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 409);

    // The recipe is reachable by its slug, with an empty review list.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/recipes/tomato-soup")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["recipe"]["title"].as_str(), Some("Tomato Soup!!"));
    assert_eq!(detail["reviews"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn unknown_category_fails_recipe_creation() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "Bread",
                "description": "Plain loaf.",
                "ingredients": ["flour"],
                "steps": ["bake"],
                "difficulty": "medium",
                "category": uuid::Uuid::new_v4().to_string(),
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 404);
}

#[actix_web::test]
async fn ratings_are_recomputed_after_every_review_mutation() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let category = seed_category(&ctx.store, "Soups").await;
    let (author_token, _) = register_user(&app, "Ada", "ada@example.com").await;
    let (fan_token, _) = register_user(&app, "Ben", "ben@example.com").await;
    let (critic_token, _) = register_user(&app, "Cleo", "cleo@example.com").await;

    let recipe = create_recipe(&app, &author_token, "Tomato Soup!!", &category).await;
    let recipe_id = recipe["id"].as_str().expect("recipe id").to_owned();

    // First review through the nested route: mean 4.0 over one review.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/recipes/{recipe_id}/reviews"))
            .insert_header(bearer(&fan_token))
            .set_json(json!({ "rating": 4, "comment": "Lovely." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);

    // Second review through the standalone route: mean drops to 3.0.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header(bearer(&critic_token))
            .set_json(json!({
                "recipeId": recipe_id,
                "rating": 2,
                "comment": "Too salty.",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let critic_review: Value = test::read_body_json(res).await;
    let critic_review_id = critic_review["id"].as_str().expect("review id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes/id/{recipe_id}"))
            .to_request(),
    )
    .await;
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched["rating"].as_f64(), Some(3.0));
    assert_eq!(fetched["reviewCount"].as_u64(), Some(2));

    // One review per user and recipe.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/recipes/{recipe_id}/reviews"))
            .insert_header(bearer(&fan_token))
            .set_json(json!({ "rating": 5, "comment": "Changed my mind." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 409);

    // Ratings outside 1..=5 never reach the store.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/recipes/{recipe_id}/reviews"))
            .insert_header(bearer(&author_token))
            .set_json(json!({ "rating": 6, "comment": "Off the scale." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 400);

    // Deleting the low review restores the mean to 4.0.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/reviews/{critic_review_id}"))
            .insert_header(bearer(&critic_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes/id/{recipe_id}"))
            .to_request(),
    )
    .await;
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched["rating"].as_f64(), Some(4.0));
    assert_eq!(fetched["reviewCount"].as_u64(), Some(1));
}

#[actix_web::test]
async fn review_updates_recompute_and_are_owner_gated() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let category = seed_category(&ctx.store, "Soups").await;
    let (author_token, _) = register_user(&app, "Ada", "ada@example.com").await;
    let (fan_token, _) = register_user(&app, "Ben", "ben@example.com").await;
    let (critic_token, _) = register_user(&app, "Cleo", "cleo@example.com").await;

    let recipe = create_recipe(&app, &author_token, "Tomato Soup!!", &category).await;
    let recipe_id = recipe["id"].as_str().expect("recipe id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/recipes/{recipe_id}/reviews"))
            .insert_header(bearer(&fan_token))
            .set_json(json!({ "rating": 4, "comment": "Lovely." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/recipes/{recipe_id}/reviews"))
            .insert_header(bearer(&critic_token))
            .set_json(json!({ "rating": 2, "comment": "Too salty." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let critic_review: Value = test::read_body_json(res).await;
    let critic_review_id = critic_review["id"].as_str().expect("review id").to_owned();

    // A stranger can neither update nor delete someone else's review.
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/reviews/{critic_review_id}"))
            .insert_header(bearer(&fan_token))
            .set_json(json!({ "rating": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/reviews/{critic_review_id}"))
            .insert_header(bearer(&fan_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);

    // The gated attempts left the aggregate untouched.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes/id/{recipe_id}"))
            .to_request(),
    )
    .await;
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched["rating"].as_f64(), Some(3.0));
    assert_eq!(fetched["reviewCount"].as_u64(), Some(2));

    // The author updating their own rating recomputes the mean: (4 + 5) / 2.
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/reviews/{critic_review_id}"))
            .insert_header(bearer(&critic_token))
            .set_json(json!({ "rating": 5, "comment": "Grew on me." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let updated: Value = test::read_body_json(res).await;
    assert_eq!(updated["rating"].as_u64(), Some(5));
    assert_eq!(updated["comment"].as_str(), Some("Grew on me."));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes/id/{recipe_id}"))
            .to_request(),
    )
    .await;
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched["rating"].as_f64(), Some(4.5));
    assert_eq!(fetched["reviewCount"].as_u64(), Some(2));
}

#[actix_web::test]
async fn only_the_author_or_an_admin_may_mutate_a_recipe() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let category = seed_category(&ctx.store, "Soups").await;
    let (author_token, _) = register_user(&app, "Ada", "ada@example.com").await;
    let (stranger_token, _) = register_user(&app, "Eve", "eve@example.com").await;

    let recipe = create_recipe(&app, &author_token, "Tomato Soup!!", &category).await;
    let recipe_id = recipe["id"].as_str().expect("recipe id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/recipes/{recipe_id}"))
            .insert_header(bearer(&stranger_token))
            .set_json(json!({ "description": "Hijacked." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/recipes/{recipe_id}"))
            .insert_header(bearer(&stranger_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);

    // The author can, and the recipe's reviews vanish with it.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/recipes/{recipe_id}"))
            .insert_header(bearer(&author_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes/id/{recipe_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 404);
}

#[actix_web::test]
async fn listing_supports_filters_sorting_and_pagination() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let soups = seed_category(&ctx.store, "Soups").await;
    let bakes = seed_category(&ctx.store, "Bakes").await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    create_recipe(&app, &token, "Tomato Soup", &soups).await;
    create_recipe(&app, &token, "Pumpkin Soup", &soups).await;
    create_recipe(&app, &token, "Banana Bread", &bakes).await;

    // Category filter.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/recipes?category={soups}"))
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["total"].as_u64(), Some(2));

    // Case-insensitive search over titles.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/recipes?search=SOUP")
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["total"].as_u64(), Some(2));

    // Title sort ascending.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/recipes?sort=title")
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(res).await;
    let titles: Vec<&str> = page["recipes"]
        .as_array()
        .expect("recipes array")
        .iter()
        .map(|recipe| recipe["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Banana Bread", "Pumpkin Soup", "Tomato Soup"]);

    // Pagination: one per page, three pages.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/recipes?limit=1&page=2&sort=title")
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["recipes"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["recipes"][0]["title"].as_str(), Some("Pumpkin Soup"));
    assert_eq!(page["totalPages"].as_u64(), Some(3));

    // Bad query parameters are rejected up front.
    for uri in [
        "/api/recipes?sort=views",
        "/api/recipes?page=0",
        "/api/recipes?limit=0",
        "/api/recipes?limit=1000",
        "/api/recipes?difficulty=expert",
    ] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), 400, "{uri} must be rejected");
    }
}
