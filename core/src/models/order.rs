// core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::product::ProductSummary;
use super::user::UserContact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Canceled,
  Refunded,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Canceled,
    OrderStatus::Refunded,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "PENDING",
      OrderStatus::Processing => "PROCESSING",
      OrderStatus::Shipped => "SHIPPED",
      OrderStatus::Delivered => "DELIVERED",
      OrderStatus::Canceled => "CANCELED",
      OrderStatus::Refunded => "REFUNDED",
    }
  }

  /// Comma-separated list used in validation messages.
  pub fn allowed_values() -> String {
    Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Case-insensitive: `shipped` and `SHIPPED` are the same status.
impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let upper = s.trim().to_uppercase();
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == upper)
      .ok_or_else(|| format!("Invalid status. Allowed statuses are: {}", Self::allowed_values()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  /// Unit price captured when the order was placed.
  pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: ProductSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub user: UserContact,
  pub status: OrderStatus,
  pub total_amount_cents: i64,
  pub shipping_address: Value,
  pub billing_address: Value,
  pub payment_method: String,
  pub payment_result: Value,
  pub items: Vec<OrderLine>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Checkout input as supplied by the customer.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
  pub shipping_address: Value,
  pub billing_address: Value,
  pub payment_method: String,
  pub payment_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
}

/// Everything needed to insert an order row and its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub total_amount_cents: i64,
  pub shipping_address: Value,
  pub billing_address: Value,
  pub payment_method: String,
  pub payment_result: Value,
  pub lines: Vec<NewOrderLine>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
    assert_eq!(" Canceled ".parse::<OrderStatus>(), Ok(OrderStatus::Canceled));
  }

  #[test]
  fn unknown_status_lists_allowed_values() {
    let err = "LOST".parse::<OrderStatus>().unwrap_err();
    assert!(err.contains("PENDING, PROCESSING, SHIPPED, DELIVERED, CANCELED, REFUNDED"));
  }

  #[test]
  fn status_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&OrderStatus::Delivered).unwrap(), "\"DELIVERED\"");
  }
}
