// tests/order_tests.rs
mod common;

use common::*;
use storefront::models::{OrderStatus, PageRequest, ProductChanges, UserContact};
use storefront::services::{cart, catalog, orders, payment};
use storefront::store::{CartStore, CatalogStore, CheckoutTx, OrderStore};
use storefront::StoreError;

#[tokio::test]
async fn checkout_creates_order_decrements_stock_and_empties_cart() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 3).await.unwrap();
  cart::add_item(&shop.store, shop.alice.id, shop.gadget.id, 2).await.unwrap();

  let order = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap();

  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.user_id, shop.alice.id);
  assert_eq!(order.user, UserContact::from(&shop.alice));
  assert_eq!(order.total_amount_cents, 3 * 1999 + 2 * 4500);
  assert_eq!(order.items.len(), 2);
  assert_eq!(order.payment_result["status"], "SIMULATED_SUCCESS");
  assert_eq!(order.payment_result["token"], "tok_visa");
  assert_eq!(order.shipping_address, address());

  let widget = shop.store.find_product(shop.widget.id).await.unwrap().unwrap();
  let gadget = shop.store.find_product(shop.gadget.id).await.unwrap().unwrap();
  assert_eq!(widget.stock, 2);
  assert_eq!(gadget.stock, 0);

  let cart_after = shop.store.get_or_create_cart(shop.alice.id).await.unwrap();
  assert!(cart_after.is_empty());
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 2).await.unwrap();
  cart::add_item(&shop.store, shop.alice.id, shop.gadget.id, 2).await.unwrap();

  // Stock drops after the items were carted.
  catalog::update_product(
    &shop.store,
    shop.gadget.id,
    ProductChanges {
      stock: Some(1),
      ..Default::default()
    },
  )
  .await
  .unwrap();

  let err = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap_err();
  match &err {
    StoreError::InsufficientStock {
      product_name,
      available,
      requested,
      ..
    } => {
      assert_eq!(product_name, "Gadget");
      assert_eq!(*available, 1);
      assert_eq!(*requested, 2);
    }
    other => panic!("Expected InsufficientStock, got {:?}", other),
  }
  assert_eq!(
    err.to_string(),
    "Insufficient stock for product: Gadget. Available: 1, Requested: 2"
  );

  let widget = shop.store.find_product(shop.widget.id).await.unwrap().unwrap();
  assert_eq!(widget.stock, 5);
  let history = shop.store.list_orders(shop.alice.id, PageRequest::default()).await.unwrap();
  assert_eq!(history.meta.total, 0);
  let cart_after = shop.store.get_or_create_cart(shop.alice.id).await.unwrap();
  assert_eq!(cart_after.items.len(), 2);
}

#[tokio::test]
async fn order_items_keep_the_price_paid() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 1).await.unwrap();
  let order = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap();

  catalog::update_product(
    &shop.store,
    shop.widget.id,
    ProductChanges {
      price_cents: Some(99_999),
      ..Default::default()
    },
  )
  .await
  .unwrap();

  let stored = orders::get_order(&shop.store, shop.alice.id, order.id).await.unwrap();
  assert_eq!(stored.items[0].item.price_cents, 1999);
  assert_eq!(stored.items[0].product.price_cents, 99_999);
  assert_eq!(stored.total_amount_cents, 1999);
}

#[tokio::test]
async fn empty_cart_checkout_fails_without_side_effects() {
  let shop = shop().await;
  let err = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap_err();
  assert!(matches!(err, StoreError::EmptyCart));
  assert_eq!(err.to_string(), "Cart is empty. Cannot create order.");

  let history = shop.store.list_orders(shop.alice.id, PageRequest::default()).await.unwrap();
  assert!(history.data.is_empty());
}

#[tokio::test]
async fn invalid_checkout_input_is_rejected_before_touching_the_cart() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 1).await.unwrap();
  let mut input = order_input();
  input.shipping_address = serde_json::json!("not an object");

  let err = orders::checkout(&shop.store, shop.alice.id, input).await.unwrap_err();
  assert!(matches!(err, StoreError::Validation(_)));
  assert_eq!(shop.store.get_or_create_cart(shop.alice.id).await.unwrap().items.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_checkouts_for_the_last_unit_commit_once() {
  let shop = shop().await;
  let last_one = add_product(&shop.store, "Rare", 10_000, 1).await;
  cart::add_item(&shop.store, shop.alice.id, last_one.id, 1).await.unwrap();
  cart::add_item(&shop.store, shop.bob.id, last_one.id, 1).await.unwrap();

  let (store_a, store_b) = (shop.store.clone(), shop.store.clone());
  let (alice, bob) = (shop.alice.id, shop.bob.id);
  let a = tokio::spawn(async move { orders::checkout(&store_a, alice, order_input()).await });
  let b = tokio::spawn(async move { orders::checkout(&store_b, bob, order_input()).await });
  let results = [a.await.unwrap(), b.await.unwrap()];

  let committed = results.iter().filter(|r| r.is_ok()).count();
  assert_eq!(committed, 1);
  assert!(results
    .iter()
    .any(|r| matches!(r, Err(StoreError::InsufficientStock { available: 0, .. }))));

  let rare = shop.store.find_product(last_one.id).await.unwrap().unwrap();
  assert_eq!(rare.stock, 0);
}

#[tokio::test]
async fn dropped_transaction_leaves_store_unchanged() {
  let shop = shop().await;
  {
    let mut tx = shop.store.begin_checkout().await.unwrap();
    tx.decrement_stock(shop.widget.id, 5).await.unwrap();
    assert_eq!(tx.product_snapshot(shop.widget.id).await.unwrap().unwrap().stock, 0);
  }
  let widget = shop.store.find_product(shop.widget.id).await.unwrap().unwrap();
  assert_eq!(widget.stock, 5);
}

#[tokio::test]
async fn guarded_decrement_refuses_to_oversell() {
  let shop = shop().await;
  let mut tx = shop.store.begin_checkout().await.unwrap();
  let err = tx.decrement_stock(shop.gadget.id, 3).await.unwrap_err();
  assert!(matches!(
    err,
    StoreError::InsufficientStock {
      available: 2,
      requested: 3,
      ..
    }
  ));
}

#[tokio::test]
async fn history_is_newest_first_and_paginated() {
  let shop = shop().await;
  let mut placed = Vec::new();
  for _ in 0..3 {
    cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 1).await.unwrap();
    placed.push(orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap().id);
  }

  let first = orders::list_orders(&shop.store, shop.alice.id, PageRequest::new(Some(1), Some(2)))
    .await
    .unwrap();
  assert_eq!(first.meta.total, 3);
  assert_eq!(first.meta.total_pages, 2);
  assert_eq!(first.data.iter().map(|o| o.id).collect::<Vec<_>>(), vec![placed[2], placed[1]]);
  assert!(first.data.iter().all(|o| o.user.email == shop.alice.email));

  let second = orders::list_orders(&shop.store, shop.alice.id, PageRequest::new(Some(2), Some(2)))
    .await
    .unwrap();
  assert_eq!(second.data.len(), 1);
  assert_eq!(second.data[0].id, placed[0]);

  let bobs = orders::list_orders(&shop.store, shop.bob.id, PageRequest::default()).await.unwrap();
  assert!(bobs.data.is_empty());
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 1).await.unwrap();
  let order = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap();

  let err = orders::get_order(&shop.store, shop.bob.id, order.id).await.unwrap_err();
  assert!(matches!(err, StoreError::Forbidden(_)));
  let err = orders::get_order(&shop.store, shop.bob.id, uuid::Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn status_updates_parse_case_insensitively() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 1).await.unwrap();
  let order = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap();

  let shipped = orders::update_status(&shop.store, order.id, "shipped").await.unwrap();
  assert_eq!(shipped.status, OrderStatus::Shipped);
  assert_eq!(shipped.user.name, shop.alice.name);

  let err = orders::update_status(&shop.store, order.id, "LOST").await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Invalid status. Allowed statuses are: PENDING, PROCESSING, SHIPPED, DELIVERED, CANCELED, REFUNDED"
  );

  let err = orders::update_status(&shop.store, uuid::Uuid::new_v4(), "DELIVERED").await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn oversized_order_total_fails_without_side_effects() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 2).await.unwrap();
  catalog::update_product(
    &shop.store,
    shop.widget.id,
    ProductChanges {
      price_cents: Some(i64::MAX / 2 + 1),
      ..Default::default()
    },
  )
  .await
  .unwrap();

  let err = orders::checkout(&shop.store, shop.alice.id, order_input()).await.unwrap_err();
  assert!(matches!(err, StoreError::Validation(_)));

  let widget = shop.store.find_product(shop.widget.id).await.unwrap().unwrap();
  assert_eq!(widget.stock, 5);
  let history = shop.store.list_orders(shop.alice.id, PageRequest::default()).await.unwrap();
  assert_eq!(history.meta.total, 0);
  assert_eq!(shop.store.get_or_create_cart(shop.alice.id).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn create_order_checks_the_total_against_current_prices() {
  let shop = shop().await;
  cart::add_item(&shop.store, shop.alice.id, shop.widget.id, 2).await.unwrap();
  let cart = orders::load_checkout_cart(&shop.store, shop.alice.id).await.unwrap();
  let receipt = payment::authorize("card", "tok_visa", cart.subtotal_cents().unwrap()).unwrap();

  catalog::update_product(
    &shop.store,
    shop.widget.id,
    ProductChanges {
      price_cents: Some(i64::MAX),
      ..Default::default()
    },
  )
  .await
  .unwrap();

  let err = orders::create_order(&shop.store, &cart, &order_input(), &receipt).await.unwrap_err();
  assert_eq!(err.to_string(), "Order total is too large.");
  let widget = shop.store.find_product(shop.widget.id).await.unwrap().unwrap();
  assert_eq!(widget.stock, 5);
}
