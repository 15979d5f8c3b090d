// core/src/services/orders.rs

//! Order creation from a cart, plus order history and status changes.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::payment::{self, PaymentReceipt};
use crate::error::{StoreError, StoreResult};
use crate::models::{Cart, NewOrder, NewOrderLine, Order, OrderStatus, Page, PageRequest, PlaceOrder};
use crate::store::Store;

/// Checks the customer-supplied checkout fields.
pub fn validate_checkout(input: &PlaceOrder) -> StoreResult<()> {
  let missing = input.shipping_address.is_null()
    || input.billing_address.is_null()
    || input.payment_method.trim().is_empty()
    || input.payment_token.trim().is_empty();
  if missing {
    return Err(StoreError::Validation(
      "Missing required fields: shippingAddress, billingAddress, paymentMethod, paymentConfirmationToken".to_string(),
    ));
  }
  if !input.shipping_address.is_object() || !input.billing_address.is_object() {
    return Err(StoreError::Validation(
      "shippingAddress and billingAddress must be objects".to_string(),
    ));
  }
  Ok(())
}

/// Loads the user's cart for checkout. Fails with `EmptyCart` when there is
/// nothing to order.
#[instrument(name = "orders::load_checkout_cart", skip(store))]
pub async fn load_checkout_cart(store: &dyn Store, user_id: Uuid) -> StoreResult<Cart> {
  let cart = store.get_or_create_cart(user_id).await?;
  if cart.is_empty() {
    return Err(StoreError::EmptyCart);
  }
  Ok(cart)
}

/// Turns `cart` into an order inside one store transaction.
///
/// Products are re-read inside the transaction, so prices are captured and
/// stock is checked as of this instant. Any failure drops the transaction
/// and leaves stock, orders and the cart untouched.
#[instrument(name = "orders::create_order", skip_all, fields(user_id = %cart.user_id, cart_id = %cart.id))]
pub async fn create_order(
  store: &dyn Store,
  cart: &Cart,
  input: &PlaceOrder,
  payment: &PaymentReceipt,
) -> StoreResult<Order> {
  if cart.is_empty() {
    return Err(StoreError::EmptyCart);
  }

  let mut tx = store.begin_checkout().await?;

  let mut lines = Vec::with_capacity(cart.items.len());
  let mut total_amount_cents: i64 = 0;
  for line in &cart.items {
    let product_id = line.item.product_id;
    let quantity = line.item.quantity;
    let current = tx
      .product_snapshot(product_id)
      .await?
      .ok_or_else(|| StoreError::NotFound(format!("Product with ID {} not found.", product_id)))?;
    if current.stock < quantity {
      warn!(%product_id, available = current.stock, requested = quantity, "Insufficient stock at checkout.");
      return Err(StoreError::InsufficientStock {
        product_id,
        product_name: current.name,
        available: current.stock,
        requested: quantity,
      });
    }
    total_amount_cents = current
      .price_cents
      .checked_mul(i64::from(quantity))
      .and_then(|line_total| total_amount_cents.checked_add(line_total))
      .ok_or_else(|| StoreError::Validation("Order total is too large.".to_string()))?;
    lines.push(NewOrderLine {
      product_id,
      quantity,
      price_cents: current.price_cents,
    });
  }

  let order = tx
    .insert_order(&NewOrder {
      user_id: cart.user_id,
      total_amount_cents,
      shipping_address: input.shipping_address.clone(),
      billing_address: input.billing_address.clone(),
      payment_method: input.payment_method.trim().to_string(),
      payment_result: payment.to_json(),
      lines: lines.clone(),
    })
    .await?;

  for line in &lines {
    tx.decrement_stock(line.product_id, line.quantity).await?;
  }
  tx.clear_cart(cart.id).await?;
  tx.commit().await?;

  info!(order_id = %order.id, total_amount_cents, items = lines.len(), "Order created.");
  Ok(order)
}

/// Validates input, loads the cart, authorizes payment and creates the order.
pub async fn checkout(store: &dyn Store, user_id: Uuid, input: PlaceOrder) -> StoreResult<Order> {
  validate_checkout(&input)?;
  let cart = load_checkout_cart(store, user_id).await?;
  let cart_total = cart.subtotal_cents()?;
  let receipt = payment::authorize(&input.payment_method, &input.payment_token, cart_total)?;
  create_order(store, &cart, &input, &receipt).await
}

#[instrument(name = "orders::list_orders", skip(store))]
pub async fn list_orders(store: &dyn Store, user_id: Uuid, page: PageRequest) -> StoreResult<Page<Order>> {
  store.list_orders(user_id, page).await
}

#[instrument(name = "orders::get_order", skip(store))]
pub async fn get_order(store: &dyn Store, user_id: Uuid, order_id: Uuid) -> StoreResult<Order> {
  let order = store
    .find_order(order_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Order"))?;
  if order.user_id != user_id {
    warn!(%order_id, "Order requested by a user who does not own it.");
    return Err(StoreError::Forbidden(
      "Forbidden: You do not have access to this order.".to_string(),
    ));
  }
  Ok(order)
}

#[instrument(name = "orders::update_status", skip(store))]
pub async fn update_status(store: &dyn Store, order_id: Uuid, raw_status: &str) -> StoreResult<Order> {
  if raw_status.trim().is_empty() {
    return Err(StoreError::Validation("Status is required".to_string()));
  }
  let status: OrderStatus = raw_status.parse().map_err(StoreError::Validation)?;
  let order = store
    .update_order_status(order_id, status)
    .await?
    .ok_or_else(|| StoreError::not_found("Order"))?;
  info!(%order_id, %status, "Order status updated.");
  Ok(order)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn input() -> PlaceOrder {
    PlaceOrder {
      shipping_address: json!({ "street": "1 Main St" }),
      billing_address: json!({ "street": "1 Main St" }),
      payment_method: "card".to_string(),
      payment_token: "tok_1".to_string(),
    }
  }

  #[test]
  fn complete_input_passes() {
    assert!(validate_checkout(&input()).is_ok());
  }

  #[test]
  fn addresses_must_be_objects() {
    let mut bad = input();
    bad.billing_address = json!("1 Main St");
    let err = validate_checkout(&bad).unwrap_err();
    assert_eq!(err.to_string(), "shippingAddress and billingAddress must be objects");
  }

  #[test]
  fn missing_token_is_reported() {
    let mut bad = input();
    bad.payment_token = String::new();
    assert!(validate_checkout(&bad)
      .unwrap_err()
      .to_string()
      .starts_with("Missing required fields"));
  }
}
