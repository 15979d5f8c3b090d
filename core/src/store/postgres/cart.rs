// core/src/store/postgres/cart.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{LineProduct, PgStore, LINE_PRODUCT_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::models::{Cart, CartItem, CartLine};
use crate::store::CartStore;

const CART_ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CartLineRow {
  #[sqlx(flatten)]
  item: CartItem,
  #[sqlx(flatten)]
  product: LineProduct,
}

#[derive(Debug, FromRow)]
struct OwnedCartItemRow {
  #[sqlx(flatten)]
  item: CartItem,
  owner_id: Uuid,
}

#[async_trait]
impl CartStore for PgStore {
  async fn get_or_create_cart(&self, user_id: Uuid) -> StoreResult<Cart> {
    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    if !user_exists {
      return Err(StoreError::not_found("User"));
    }

    sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
      .bind(Uuid::new_v4())
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    let cart = sqlx::query_as::<_, CartRow>("SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = $1")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;

    let lines = sqlx::query_as::<_, CartLineRow>(&format!(
      "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.created_at, ci.updated_at, {} \
       FROM cart_items ci JOIN products p ON p.id = ci.product_id \
       WHERE ci.cart_id = $1 ORDER BY ci.created_at ASC, ci.id ASC",
      LINE_PRODUCT_COLUMNS
    ))
    .bind(cart.id)
    .fetch_all(&self.pool)
    .await?;

    Ok(Cart {
      id: cart.id,
      user_id: cart.user_id,
      items: lines
        .into_iter()
        .map(|row| CartLine {
          product: row.product.into_summary(row.item.product_id),
          item: row.item,
        })
        .collect(),
      created_at: cart.created_at,
      updated_at: cart.updated_at,
    })
  }

  async fn find_cart_item(&self, item_id: Uuid) -> StoreResult<Option<(CartItem, Uuid)>> {
    let row = sqlx::query_as::<_, OwnedCartItemRow>(
      "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.created_at, ci.updated_at, c.user_id AS owner_id \
       FROM cart_items ci JOIN carts c ON c.id = ci.cart_id WHERE ci.id = $1",
    )
    .bind(item_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(|r| (r.item, r.owner_id)))
  }

  async fn insert_cart_item(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
    let item = sqlx::query_as::<_, CartItem>(&format!(
      "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) RETURNING {}",
      CART_ITEM_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&self.pool)
    .await?;
    Ok(item)
  }

  async fn set_cart_item_quantity(&self, item_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
    sqlx::query_as::<_, CartItem>(&format!(
      "UPDATE cart_items SET quantity = $2, updated_at = now() WHERE id = $1 RETURNING {}",
      CART_ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Cart item"))
  }

  async fn delete_cart_item(&self, item_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
      .bind(item_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::not_found("Cart item"));
    }
    Ok(())
  }

  async fn clear_cart(&self, cart_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
