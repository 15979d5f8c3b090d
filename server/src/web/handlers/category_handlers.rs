// server/src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use storefront::models::NewCategory;
use storefront::services::catalog;
use tracing::instrument;

use super::{created, ok};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = catalog::list_categories(app_state.store.as_ref()).await?;
  Ok(ok("Categories fetched successfully", categories))
}

#[instrument(
    name = "handler::create_category",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id(), name = %req_payload.name)
)]
pub async fn create_category_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<NewCategory>,
) -> Result<HttpResponse, AppError> {
  let category = catalog::create_category(app_state.store.as_ref(), req_payload.into_inner()).await?;
  Ok(created("Category created successfully", category))
}
