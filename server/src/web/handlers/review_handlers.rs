// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::models::ReviewChanges;
use storefront::services::reviews::{self, ReviewDraft};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{created, ok};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateReviewPayload {
  pub rating: Option<i16>,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub comment: String,
}

impl CreateReviewPayload {
  fn into_draft(self) -> Result<ReviewDraft, AppError> {
    let rating = self
      .rating
      .ok_or_else(|| AppError::Validation("Rating must be a number between 1 and 5.".to_string()))?;
    Ok(ReviewDraft {
      rating,
      title: self.title,
      comment: self.comment,
    })
  }
}

#[instrument(name = "handler::list_product_reviews", skip(app_state))]
pub async fn list_product_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let reviews = reviews::list_reviews(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(ok("Reviews fetched successfully", reviews))
}

#[instrument(
    name = "handler::create_review",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<CreateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let draft = req_payload.into_inner().into_draft()?;
  let review = reviews::create_review(app_state.store.as_ref(), auth_user.id(), path.into_inner(), draft).await?;
  info!(review_id = %review.id, "Review created.");
  Ok(created("Review created successfully", review))
}

#[instrument(name = "handler::get_review", skip(app_state))]
pub async fn get_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let review = reviews::get_review(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(ok("Review fetched successfully", review))
}

#[instrument(
    name = "handler::update_review",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn update_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ReviewChanges>,
) -> Result<HttpResponse, AppError> {
  let review = reviews::update_review(
    app_state.store.as_ref(),
    auth_user.id(),
    path.into_inner(),
    req_payload.into_inner(),
  )
  .await?;
  Ok(ok("Review updated successfully", review))
}

#[instrument(
    name = "handler::delete_review",
    skip(app_state, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  reviews::delete_review(app_state.store.as_ref(), auth_user.id(), path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
