// server/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{
  auth_handlers, cart_handlers, category_handlers, order_handlers, product_handlers, review_handlers,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "UP", "message": "API is healthy" }))
}

async fn welcome_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "message": "Welcome to the Storefront API v1",
    "environment": app_state.config.app_env.as_str(),
  }))
}

pub async fn not_found_handler() -> HttpResponse {
  HttpResponse::NotFound().json(json!({ "message": "Not Found" }))
}

fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
  warn!(path = %req.path(), error = %err, "Rejected JSON payload.");
  AppError::Validation("Invalid JSON payload.".to_string()).into()
}

fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
  warn!(path = %req.path(), error = %err, "Rejected query string.");
  AppError::Validation(format!("Invalid query parameters: {}", err)).into()
}

fn path_error_handler(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
  warn!(path = %req.path(), error = %err, "Rejected path parameter.");
  AppError::Validation("Invalid identifier in request path.".to_string()).into()
}

/// Registers the whole API plus the extractor error handlers and the JSON 404
/// fallback. `main.rs` and the HTTP tests both build the app through this.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .route("/api/health", web::get().to(health_check_handler))
    .service(
      web::scope("/api/v1")
        .route("", web::get().to(welcome_handler))
        // Authentication Routes
        .service(
          web::scope("/auth")
            .route("/signup", web::post().to(auth_handlers::signup_handler))
            .route("/signin", web::post().to(auth_handlers::signin_handler))
            .route("/me", web::get().to(auth_handlers::me_handler)),
        )
        .service(
          web::resource("/categories")
            .route(web::get().to(category_handlers::list_categories_handler))
            .route(web::post().to(category_handlers::create_category_handler)),
        )
        // Catalog Routes (reads are public, writes need a user)
        .service(
          web::scope("/products")
            .service(
              web::resource("")
                .route(web::get().to(product_handlers::list_products_handler))
                .route(web::post().to(product_handlers::create_product_handler)),
            )
            .service(
              web::resource("/{product_id}")
                .route(web::get().to(product_handlers::get_product_handler))
                .route(web::put().to(product_handlers::update_product_handler))
                .route(web::delete().to(product_handlers::delete_product_handler)),
            )
            .service(
              web::resource("/{product_id}/reviews")
                .route(web::get().to(review_handlers::list_product_reviews_handler))
                .route(web::post().to(review_handlers::create_review_handler)),
            ),
        )
        .service(
          web::resource("/reviews/{review_id}")
            .route(web::get().to(review_handlers::get_review_handler))
            .route(web::put().to(review_handlers::update_review_handler))
            .route(web::delete().to(review_handlers::delete_review_handler)),
        )
        // Cart Routes
        .service(
          web::scope("/cart")
            .route("", web::get().to(cart_handlers::view_cart_handler))
            .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
            .service(
              web::resource("/items/{item_id}")
                .route(web::put().to(cart_handlers::update_cart_item_handler))
                .route(web::delete().to(cart_handlers::remove_cart_item_handler)),
            )
            .route("/clear", web::post().to(cart_handlers::clear_cart_handler)),
        )
        // Order Routes
        .service(
          web::scope("/orders")
            .service(
              web::resource("")
                .route(web::get().to(order_handlers::list_orders_handler))
                .route(web::post().to(order_handlers::create_order_handler)),
            )
            .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
            .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler)),
        ),
    )
    .default_service(web::route().to(not_found_handler));
}
