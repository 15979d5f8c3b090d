// core/src/store/postgres/orders.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgConnection, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::{LineProduct, PgStore, LINE_PRODUCT_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::models::{NewOrder, Order, OrderItem, OrderLine, OrderStatus, Page, PageRequest, UserContact};
use crate::store::{CheckoutTx, OrderStore, StockSnapshot};

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount_cents, shipping_address, billing_address, \
   payment_method, payment_result, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  status: OrderStatus,
  total_amount_cents: i64,
  shipping_address: Value,
  billing_address: Value,
  payment_method: String,
  payment_result: Value,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl OrderRow {
  fn into_order(self, user: UserContact, items: Vec<OrderLine>) -> Order {
    Order {
      id: self.id,
      user_id: self.user_id,
      user,
      status: self.status,
      total_amount_cents: self.total_amount_cents,
      shipping_address: self.shipping_address,
      billing_address: self.billing_address,
      payment_method: self.payment_method,
      payment_result: self.payment_result,
      items,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
  #[sqlx(flatten)]
  item: OrderItem,
  #[sqlx(flatten)]
  product: LineProduct,
}

/// Loads the customer and lines of every order in `rows` and attaches them.
async fn with_lines(conn: &mut PgConnection, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
  let lines = sqlx::query_as::<_, OrderLineRow>(&format!(
    "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price_cents, {} \
     FROM order_items oi JOIN products p ON p.id = oi.product_id \
     WHERE oi.order_id = ANY($1) ORDER BY p.name ASC, oi.id ASC",
    LINE_PRODUCT_COLUMNS
  ))
  .bind(&ids)
  .fetch_all(&mut *conn)
  .await?;

  let user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
  let customers: HashMap<Uuid, UserContact> =
    sqlx::query_as::<_, UserContact>("SELECT id, name, email FROM users WHERE id = ANY($1)")
      .bind(&user_ids)
      .fetch_all(&mut *conn)
      .await?
      .into_iter()
      .map(|user| (user.id, user))
      .collect();

  let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
  for row in lines {
    by_order.entry(row.item.order_id).or_default().push(OrderLine {
      product: row.product.into_summary(row.item.product_id),
      item: row.item,
    });
  }
  rows
    .into_iter()
    .map(|row| {
      let user = customers
        .get(&row.user_id)
        .cloned()
        .ok_or_else(|| StoreError::Internal(format!("Order {} references a missing user.", row.id)))?;
      let items = by_order.remove(&row.id).unwrap_or_default();
      Ok(row.into_order(user, items))
    })
    .collect()
}

/// Checkout transaction over a pooled connection. Dropping it without
/// `commit` lets sqlx roll the transaction back.
struct PgCheckoutTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
  async fn product_snapshot(&mut self, product_id: Uuid) -> StoreResult<Option<StockSnapshot>> {
    let row: Option<(Uuid, String, i64, i32)> =
      sqlx::query_as("SELECT id, name, price_cents, stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;
    Ok(row.map(|(product_id, name, price_cents, stock)| StockSnapshot {
      product_id,
      name,
      price_cents,
      stock,
    }))
  }

  async fn insert_order(&mut self, new_order: &NewOrder) -> StoreResult<Order> {
    let order = sqlx::query_as::<_, OrderRow>(&format!(
      "INSERT INTO orders (id, user_id, status, total_amount_cents, shipping_address, billing_address, \
         payment_method, payment_result) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(new_order.user_id)
    .bind(OrderStatus::Pending)
    .bind(new_order.total_amount_cents)
    .bind(&new_order.shipping_address)
    .bind(&new_order.billing_address)
    .bind(&new_order.payment_method)
    .bind(&new_order.payment_result)
    .fetch_one(&mut *self.tx)
    .await?;

    for line in &new_order.lines {
      sqlx::query("INSERT INTO order_items (id, order_id, product_id, quantity, price_cents) VALUES ($1, $2, $3, $4, $5)")
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price_cents)
        .execute(&mut *self.tx)
        .await?;
    }

    with_lines(&mut *self.tx, vec![order])
      .await?
      .pop()
      .ok_or_else(|| StoreError::Internal("Inserted order could not be read back.".to_string()))
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> StoreResult<()> {
    let result = sqlx::query(
      "UPDATE products SET stock = stock - $1, updated_at = now() WHERE id = $2 AND stock >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *self.tx)
    .await?;
    if result.rows_affected() == 1 {
      return Ok(());
    }

    match self.product_snapshot(product_id).await? {
      Some(current) => Err(StoreError::InsufficientStock {
        product_id,
        product_name: current.name,
        available: current.stock,
        requested: quantity,
      }),
      None => Err(StoreError::NotFound(format!("Product with ID {} not found.", product_id))),
    }
  }

  async fn clear_cart(&mut self, cart_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> StoreResult<()> {
    self.tx.commit().await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgCheckoutTx { tx }))
  }

  async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> StoreResult<Page<Order>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .bind(i64::from(page.limit))
    .bind(page.offset() as i64)
    .fetch_all(&self.pool)
    .await?;

    let mut conn = self.pool.acquire().await?;
    Ok(Page {
      data: with_lines(&mut conn, rows).await?,
      meta: page.meta(total.max(0) as u64),
    })
  }

  async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match row {
      Some(row) => {
        let mut conn = self.pool.acquire().await?;
        Ok(with_lines(&mut conn, vec![row]).await?.pop())
      }
      None => Ok(None),
    }
  }

  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
      "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(&self.pool)
    .await?;
    match row {
      Some(row) => {
        let mut conn = self.pool.acquire().await?;
        Ok(with_lines(&mut conn, vec![row]).await?.pop())
      }
      None => Ok(None),
    }
  }
}
