// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use storefront::models::PlaceOrder;
use storefront::services::orders;
use storefront::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{created, ok, paged, PageParams};
use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// Checkout body. Absent fields stay null/empty so the checkout validation
/// can name every required field at once.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderPayload {
  pub shipping_address: Value,
  pub billing_address: Value,
  pub payment_method: String,
  pub payment_confirmation_token: String,
}

impl From<CreateOrderPayload> for PlaceOrder {
  fn from(payload: CreateOrderPayload) -> Self {
    PlaceOrder {
      shipping_address: payload.shipping_address,
      billing_address: payload.billing_address,
      payment_method: payload.payment_method,
      payment_token: payload.payment_confirmation_token,
    }
  }
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  #[serde(default)]
  pub status: Option<String>,
}

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id(), payment_method = %req_payload.payment_method)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(
    app_state.store.clone(),
    auth_user.id(),
    req_payload.into_inner().into(),
  ));

  match app_state.pipelines.checkout.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let order = ctx_data.into_inner().and_then(|data| data.order).ok_or_else(|| {
        warn!("Checkout pipeline completed but no order was recorded.");
        AppError::Internal("Checkout completed, but the order is unavailable.".to_string())
      })?;
      info!(order_id = %order.id, total_cents = order.total_amount_cents, "Checkout successful.");
      Ok(created("Order created successfully", order))
    }
    PipelineResult::Stopped => {
      warn!("Checkout pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  params: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
  let page = orders::list_orders(app_state.store.as_ref(), auth_user.id(), params.to_request()).await?;
  Ok(paged("Orders fetched successfully", page))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = orders::get_order(app_state.store.as_ref(), auth_user.id(), path.into_inner()).await?;
  Ok(ok("Order details fetched successfully", order))
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id(), status = ?req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let raw_status = req_payload.into_inner().status.unwrap_or_default();
  let order = orders::update_status(app_state.store.as_ref(), path.into_inner(), &raw_status).await?;
  Ok(ok("Order status updated successfully", order))
}
