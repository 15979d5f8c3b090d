// server/src/pipelines/checkout_pipeline.rs
use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use storefront::services::{orders, payment};
use storefront::{ContextData, Pipeline, PipelineControl};
use tracing::{info, warn};

pub const CHECKOUT_STEPS: [&str; 4] = ["validate_checkout_input", "load_cart", "authorize_payment", "place_order"];

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    (CHECKOUT_STEPS[0], false, None),
    (CHECKOUT_STEPS[1], false, None),
    (CHECKOUT_STEPS[2], false, None),
    (CHECKOUT_STEPS[3], false, None),
  ]);

  // Step 1: addresses are objects, payment method and token are present.
  p.on_root("validate_checkout_input", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      orders::validate_checkout(&ctx_data.read().input)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 2: fails with an empty-cart error before anything is written.
  p.on_root("load_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, user_id) = {
        let guard = ctx_data.read();
        (guard.store.clone(), guard.authenticated_user_id)
      };
      let cart = orders::load_checkout_cart(store.as_ref(), user_id).await?;
      info!(
        "Checkout Pipeline (User {}): Cart {} loaded with {} line(s).",
        user_id,
        cart.id,
        cart.items.len()
      );
      ctx_data.write().cart = Some(cart);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 3: simulated; a present confirmation token counts as paid.
  p.on_root("authorize_payment", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let receipt = {
        let guard = ctx_data.read();
        let amount_cents = guard
          .cart
          .as_ref()
          .ok_or_else(|| AppError::Internal("Cart must be loaded before payment.".to_string()))?
          .subtotal_cents()?;
        payment::authorize(&guard.input.payment_method, &guard.input.payment_token, amount_cents)?
      };
      ctx_data.write().payment = Some(receipt);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Only an authorized payment may reach the order transaction.
  p.before_root("place_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let authorized = ctx_data
        .read()
        .payment
        .as_ref()
        .is_some_and(|receipt| receipt.status == payment::SIMULATED_SUCCESS);
      if !authorized {
        warn!("Checkout Pipeline: payment not authorized, refusing to place the order.");
        return Err(AppError::Validation("Payment was not authorized.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Step 4: the single store transaction. Prices and stock are re-read inside it.
  p.on_root("place_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, cart, input, receipt) = {
        let guard = ctx_data.read();
        (
          guard.store.clone(),
          guard.cart.clone(),
          guard.input.clone(),
          guard.payment.clone(),
        )
      };
      let (cart, receipt) = cart
        .zip(receipt)
        .ok_or_else(|| AppError::Internal("Cart and payment must be ready before placing the order.".to_string()))?;

      let order = orders::create_order(store.as_ref(), &cart, &input, &receipt).await?;
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.after_root("place_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      if let Some(order) = ctx_data.read().order.as_ref() {
        info!(
          "Checkout Pipeline (Order {}): Placed for user {}. Total: {} cents",
          order.id, order.user_id, order.total_amount_cents
        );
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
