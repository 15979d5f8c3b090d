// core/src/services/cart.rs

//! Per-user shopping carts.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{CartItem, CartView};
use crate::store::Store;

fn require_positive(quantity: i32, message: &str) -> StoreResult<()> {
  if quantity <= 0 {
    return Err(StoreError::Validation(message.to_string()));
  }
  Ok(())
}

/// Loads the item and checks that it sits in `user_id`'s cart.
async fn owned_item(store: &dyn Store, user_id: Uuid, item_id: Uuid) -> StoreResult<CartItem> {
  let (item, owner) = store
    .find_cart_item(item_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Cart item"))?;
  if owner != user_id {
    warn!(%item_id, "Cart item belongs to another user.");
    return Err(StoreError::Forbidden("Forbidden: You do not own this cart item.".to_string()));
  }
  Ok(item)
}

#[instrument(name = "cart::view_cart", skip(store))]
pub async fn view_cart(store: &dyn Store, user_id: Uuid) -> StoreResult<CartView> {
  store.get_or_create_cart(user_id).await?.into_view()
}

/// Adds `quantity` of a product, merging with an existing line for the same
/// product. The merged quantity must still fit the product's stock.
#[instrument(name = "cart::upsert_item", skip(store))]
pub async fn upsert_item(store: &dyn Store, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
  require_positive(quantity, "Valid Product ID and positive integer quantity are required")?;
  let product = store
    .find_product(product_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Product"))?;
  let cart = store.get_or_create_cart(user_id).await?;

  let existing = cart.line_for_product(product_id).map(|line| &line.item);
  let requested_total = existing
    .map_or(Some(quantity), |item| item.quantity.checked_add(quantity))
    .ok_or_else(|| StoreError::Validation("Requested quantity is too large.".to_string()))?;
  if product.stock < requested_total {
    return Err(StoreError::Validation(format!(
      "Not enough stock for {}. Available: {}, Requested total: {}",
      product.name, product.stock, requested_total
    )));
  }
  cart.subtotal_with(product_id, requested_total, product.price_cents)?;

  let item = match existing {
    Some(item) => store.set_cart_item_quantity(item.id, requested_total).await?,
    None => store.insert_cart_item(cart.id, product_id, quantity).await?,
  };
  info!(cart_id = %cart.id, item_id = %item.id, quantity = item.quantity, "Cart line saved.");
  Ok(item)
}

pub async fn add_item(store: &dyn Store, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartView> {
  upsert_item(store, user_id, product_id, quantity).await?;
  view_cart(store, user_id).await
}

#[instrument(name = "cart::update_item", skip(store))]
pub async fn update_item(store: &dyn Store, user_id: Uuid, item_id: Uuid, quantity: i32) -> StoreResult<CartView> {
  require_positive(
    quantity,
    "Quantity must be a positive integer. To remove, use the delete endpoint.",
  )?;
  let item = owned_item(store, user_id, item_id).await?;
  let product = store
    .find_product(item.product_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Product"))?;
  if product.stock < quantity {
    return Err(StoreError::Validation(format!(
      "Not enough stock for {}. Available: {}, Requested: {}",
      product.name, product.stock, quantity
    )));
  }
  store
    .get_or_create_cart(user_id)
    .await?
    .subtotal_with(item.product_id, quantity, product.price_cents)?;
  store.set_cart_item_quantity(item.id, quantity).await?;
  view_cart(store, user_id).await
}

#[instrument(name = "cart::remove_item", skip(store))]
pub async fn remove_item(store: &dyn Store, user_id: Uuid, item_id: Uuid) -> StoreResult<CartView> {
  let item = owned_item(store, user_id, item_id).await?;
  store.delete_cart_item(item.id).await?;
  view_cart(store, user_id).await
}

#[instrument(name = "cart::clear", skip(store))]
pub async fn clear(store: &dyn Store, user_id: Uuid) -> StoreResult<CartView> {
  let cart = store.get_or_create_cart(user_id).await?;
  store.clear_cart(cart.id).await?;
  info!(cart_id = %cart.id, "Cart cleared.");
  view_cart(store, user_id).await
}
