// server/src/pipelines/contexts.rs

//! Underlying data structs for the server's pipelines. Handlers receive them
//! wrapped in `storefront::ContextData`.

use std::sync::Arc;
use storefront::models::{Cart, CartItem, CartView, Order, PlaceOrder};
use storefront::services::payment::PaymentReceipt;
use storefront::Store;
use uuid::Uuid;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub store: Arc<dyn Store>,
  pub authenticated_user_id: Uuid,
  pub product_id: Option<Uuid>,
  pub quantity: i32,
  // Populated by the pipeline:
  pub updated_cart_item: Option<CartItem>,
  pub cart_view: Option<CartView>,
}

impl AddToCartCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, product_id: Option<Uuid>, quantity: i32) -> Self {
    Self {
      store,
      authenticated_user_id: user_id,
      product_id,
      quantity,
      updated_cart_item: None,
      cart_view: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub store: Arc<dyn Store>,
  pub authenticated_user_id: Uuid,
  pub input: PlaceOrder,
  // Populated by the pipeline:
  pub cart: Option<Cart>,
  pub payment: Option<PaymentReceipt>,
  pub order: Option<Order>,
}

impl CheckoutCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, input: PlaceOrder) -> Self {
    Self {
      store,
      authenticated_user_id: user_id,
      input,
      cart: None,
      payment: None,
      order: None,
    }
  }
}
