//! Image upload validation and storage.

mod common;

use actix_web::test;
use serde_json::Value;

use common::{bearer, register_user, test_context};
use tastebook::server::build_app;

const BOUNDARY: &str = "---------------------------9051914041544843365972754266";

fn multipart_body(parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn content_type_header() -> (&'static str, String) {
    ("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}"))
}

// Enough of a PNG header to look like image bytes.
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[actix_web::test]
async fn single_upload_stores_the_file_under_a_generated_name() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(bearer(&token))
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[("image", "photo.png", "image/png", PNG_BYTES)]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"].as_bool(), Some(true));
    let filename = body["file"]["filename"].as_str().expect("filename");
    assert!(filename.ends_with(".png"));
    assert_ne!(filename, "photo.png", "client names never reach the filesystem");
    assert_eq!(
        body["file"]["path"].as_str(),
        Some(format!("/uploads/{filename}").as_str())
    );

    let stored = ctx.uploads.path().join(filename);
    assert_eq!(std::fs::read(stored).expect("stored file"), PNG_BYTES);
}

#[actix_web::test]
async fn non_image_uploads_are_rejected() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    // Wrong extension.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(bearer(&token))
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[("image", "notes.txt", "text/plain", b"hello")]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 400);

    // Image extension with a non-image content type.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(bearer(&token))
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[("image", "fake.png", "text/plain", b"hello")]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 400);

    // Missing field.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(bearer(&token))
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[("other", "photo.png", "image/png", PNG_BYTES)]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 400);
}

#[actix_web::test]
async fn multiple_upload_accepts_several_images() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;
    let (token, _) = register_user(&app, "Ada", "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads/multiple")
            .insert_header(bearer(&token))
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[
                ("images", "one.png", "image/png", PNG_BYTES),
                ("images", "two.jpg", "image/jpeg", PNG_BYTES),
            ]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["files"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn uploads_require_authentication() {
    let ctx = test_context();
    let app = test::init_service(build_app(ctx.state.clone(), ctx.health.clone())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(content_type_header())
            .set_payload(multipart_body(&[("image", "photo.png", "image/png", PNG_BYTES)]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 401);
}
