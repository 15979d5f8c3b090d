// server/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use storefront::services::cart;
use storefront::{ContextData, Pipeline, PipelineControl};
use tracing::{info, warn};

pub const ADD_TO_CART_STEPS: [&str; 3] = ["validate_cart_input", "add_or_update_cart_item", "load_cart_view"];

pub fn build_add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, AppError> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    (ADD_TO_CART_STEPS[0], false, None),
    (ADD_TO_CART_STEPS[1], false, None),
    (ADD_TO_CART_STEPS[2], false, None),
  ]);

  // Step 1: product id present, quantity positive.
  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (product_id, quantity) = {
        let guard = ctx_data.read();
        (guard.product_id, guard.quantity)
      };

      if product_id.is_none() || quantity <= 0 {
        warn!(?product_id, quantity, "Add to Cart Pipeline: Invalid input.");
        return Err(AppError::Validation(
          "Valid Product ID and positive integer quantity are required".to_string(),
        ));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Step 2: merge into an existing line or insert a new one, within stock.
  p.on_root("add_or_update_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, user_id, product_id, quantity) = {
        let guard = ctx_data.read();
        (
          guard.store.clone(),
          guard.authenticated_user_id,
          guard.product_id,
          guard.quantity,
        )
      };
      let product_id = product_id.ok_or_else(|| AppError::Internal("Product ID missing after validation.".to_string()))?;

      let item = cart::upsert_item(store.as_ref(), user_id, product_id, quantity).await?;
      info!(
        item_id = %item.id,
        %product_id,
        quantity = item.quantity,
        "Add to Cart Pipeline: Cart item stored."
      );
      ctx_data.write().updated_cart_item = Some(item);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 3: the response body is the whole cart with fresh totals.
  p.on_root("load_cart_view", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, user_id) = {
        let guard = ctx_data.read();
        (guard.store.clone(), guard.authenticated_user_id)
      };
      let view = cart::view_cart(store.as_ref(), user_id).await?;
      ctx_data.write().cart_view = Some(view);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
