// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::services::cart;
use storefront::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ok;
use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Option<Uuid>,
  pub quantity: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub quantity: Option<i32>,
}

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let view = cart::view_cart(app_state.store.as_ref(), auth_user.id()).await?;
  Ok(ok("Cart fetched successfully", view))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id(), product_id = ?req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  // Quantity defaults to one when omitted.
  let ctx_data = ContextData::new(AddToCartCtxData::new(
    app_state.store.clone(),
    auth_user.id(),
    payload.product_id,
    payload.quantity.unwrap_or(1),
  ));

  match app_state.pipelines.add_to_cart.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let view = ctx_data.into_inner().and_then(|data| data.cart_view).ok_or_else(|| {
        warn!("Add to Cart pipeline completed but cart_view was not set.");
        AppError::Internal("Cart update completed, but the cart is unavailable.".to_string())
      })?;
      info!(lines = view.cart.items.len(), total_cents = view.total_cents, "Add to cart successful.");
      Ok(ok("Item added to cart", view))
    }
    PipelineResult::Stopped => {
      warn!("Add to Cart pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateCartItemPayload>,
) -> Result<HttpResponse, AppError> {
  let quantity = req_payload.quantity.filter(|q| *q > 0).ok_or_else(|| {
    AppError::Validation("Quantity must be a positive integer. To remove, use the delete endpoint.".to_string())
  })?;
  let view = cart::update_item(app_state.store.as_ref(), auth_user.id(), path.into_inner(), quantity).await?;
  Ok(ok("Cart item updated", view))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let view = cart::remove_item(app_state.store.as_ref(), auth_user.id(), path.into_inner()).await?;
  Ok(ok("Item removed from cart", view))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let view = cart::clear(app_state.store.as_ref(), auth_user.id()).await?;
  Ok(ok("Cart cleared", view))
}
