// tests/http_basics_tests.rs
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use serde_json::{json, Value};
use uuid::Uuid;

#[actix_web::test]
async fn health_welcome_and_unknown_routes() {
  let shop = shop().await;
  let app = init_app!(shop.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "status": "UP", "message": "API is healthy" }));

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Welcome to the Storefront API v1");
  assert_eq!(body["environment"], "development");

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v2/nothing").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "message": "Not Found" }));
}

#[actix_web::test]
async fn signup_signin_and_me() {
  let shop = shop().await;
  let app = init_app!(shop.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signup")
    .set_json(json!({ "name": "Carol", "email": "Carol@Example.com", "password": "s3cret-pass" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["data"]["email"], "carol@example.com");
  assert!(body["data"].get("passwordHash").is_none());
  let carol_id = body["data"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signin")
    .set_json(json!({ "email": "carol@example.com", "password": "s3cret-pass" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signin")
    .set_json(json!({ "email": "carol@example.com", "password": "nope-nope" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/v1/auth/me")
    .insert_header(("X-User-ID", carol_id.clone()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["data"]["id"], carol_id.as_str());

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signup")
    .set_json(json!({ "name": "Carol", "email": "carol@example.com", "password": "another-pass" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn missing_malformed_or_unknown_identity_is_unauthorized() {
  let shop = shop().await;
  let app = init_app!(shop.state);

  let headers = [None, Some("not-a-uuid".to_string()), Some(Uuid::new_v4().to_string())];
  for header in headers {
    let mut req = test::TestRequest::get().uri("/api/v1/cart");
    if let Some(value) = header {
      req = req.insert_header(("X-User-ID", value));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["statusCode"], 401);
    assert!(body.get("detail").is_none());
  }
}

#[actix_web::test]
async fn identity_is_checked_before_the_body_is_parsed() {
  let shop = shop().await;
  let app = init_app!(shop.state);

  let routes = [
    (test::TestRequest::post(), "/api/v1/cart/items".to_string()),
    (test::TestRequest::post(), "/api/v1/products".to_string()),
    (test::TestRequest::put(), format!("/api/v1/products/{}", shop.lamp.id)),
    (test::TestRequest::post(), "/api/v1/orders".to_string()),
  ];
  for (req, uri) in routes {
    let req = req
      .uri(&uri)
      .insert_header(("content-type", "application/json"))
      .set_payload("{ \"quantity\": ")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 401);
  }
}

#[actix_web::test]
async fn malformed_json_and_bad_ids_are_bad_requests() {
  let shop = shop().await;
  let app = init_app!(shop.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/cart/items")
    .insert_header(("X-User-ID", shop.alice.id.to_string()))
    .insert_header(("content-type", "application/json"))
    .set_payload("{ \"productId\": ")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Invalid JSON payload.");
  assert_eq!(body["statusCode"], 400);

  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri("/api/v1/products/not-a-uuid").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/products/{}", Uuid::new_v4()))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Product not found.");
}
