// core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::product::ProductSummary;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A cart item together with the current product data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: ProductSummary,
}

/// A user's cart; items are ordered by creation time, oldest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<CartLine>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn line_for_product(&self, product_id: Uuid) -> Option<&CartLine> {
    self.items.iter().find(|line| line.item.product_id == product_id)
  }

  /// Sum of quantity times current price over every line.
  pub fn subtotal_cents(&self) -> StoreResult<i64> {
    priced_total(self.items.iter().map(|line| (line.item.quantity, line.product.price_cents)))
  }

  /// Subtotal the cart would have with `product_id` set to `quantity` at
  /// `price_cents`. Lets callers reject a change before storing it.
  pub fn subtotal_with(&self, product_id: Uuid, quantity: i32, price_cents: i64) -> StoreResult<i64> {
    let others = self
      .items
      .iter()
      .filter(|line| line.item.product_id != product_id)
      .map(|line| (line.item.quantity, line.product.price_cents));
    priced_total(others.chain(std::iter::once((quantity, price_cents))))
  }

  pub fn into_view(self) -> StoreResult<CartView> {
    let subtotal_cents = self.subtotal_cents()?;
    // Tax and shipping are not computed yet.
    let tax_cents = 0;
    let total_cents = subtotal_cents.checked_add(tax_cents).ok_or_else(total_too_large)?;
    Ok(CartView {
      cart: self,
      subtotal_cents,
      tax_cents,
      total_cents,
    })
  }
}

fn total_too_large() -> StoreError {
  StoreError::Validation("Cart total is too large.".to_string())
}

fn priced_total(mut lines: impl Iterator<Item = (i32, i64)>) -> StoreResult<i64> {
  lines.try_fold(0i64, |acc, (quantity, price_cents)| {
    price_cents
      .checked_mul(i64::from(quantity))
      .and_then(|line_total| acc.checked_add(line_total))
      .ok_or_else(total_too_large)
  })
}

/// Cart plus totals priced at current product prices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  #[serde(flatten)]
  pub cart: Cart,
  pub subtotal_cents: i64,
  pub tax_cents: i64,
  pub total_cents: i64,
}
