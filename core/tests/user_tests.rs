// tests/user_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::services::seed;
use storefront::services::users::{self, SignIn, SignUp};
use storefront::store::CatalogStore;
use storefront::{MemoryStore, StoreError};

fn sign_up_input(email: &str) -> SignUp {
  SignUp {
    name: "Grace".to_string(),
    email: email.to_string(),
    password: "hopper1906".to_string(),
  }
}

#[tokio::test]
#[serial]
async fn sign_up_then_sign_in() {
  setup_tracing();
  let store = MemoryStore::new();
  let user = users::sign_up(&store, sign_up_input("Grace@Example.com")).await.unwrap();
  assert_eq!(user.email, "grace@example.com");
  assert_ne!(user.password_hash, "hopper1906");

  let signed_in = users::sign_in(
    &store,
    SignIn {
      email: "grace@example.com".to_string(),
      password: "hopper1906".to_string(),
    },
  )
  .await
  .unwrap();
  assert_eq!(signed_in.id, user.id);
}

#[tokio::test]
#[serial]
async fn wrong_password_and_unknown_email_are_unauthorized() {
  setup_tracing();
  let store = MemoryStore::new();
  users::sign_up(&store, sign_up_input("grace@example.com")).await.unwrap();

  for (email, password) in [("grace@example.com", "wrong-password"), ("nobody@example.com", "hopper1906")] {
    let err = users::sign_in(
      &store,
      SignIn {
        email: email.to_string(),
        password: password.to_string(),
      },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized(_)));
  }
}

#[tokio::test]
#[serial]
async fn duplicate_and_invalid_sign_ups_are_rejected() {
  setup_tracing();
  let store = MemoryStore::new();
  users::sign_up(&store, sign_up_input("grace@example.com")).await.unwrap();

  let err = users::sign_up(&store, sign_up_input("GRACE@example.com")).await.unwrap_err();
  assert!(matches!(err, StoreError::Conflict(_)));

  let err = users::sign_up(&store, sign_up_input("not-an-email")).await.unwrap_err();
  assert!(matches!(err, StoreError::Validation(_)));

  let mut short = sign_up_input("short@example.com");
  short.password = "abc".to_string();
  let err = users::sign_up(&store, short).await.unwrap_err();
  assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn seeding_runs_once() {
  setup_tracing();
  let store = MemoryStore::new();
  assert!(seed::seed_demo_data(&store).await.unwrap());
  let products = store.count_products().await.unwrap();
  assert!(products > 0);

  assert!(!seed::seed_demo_data(&store).await.unwrap());
  assert_eq!(store.count_products().await.unwrap(), products);
  assert_eq!(store.list_categories().await.unwrap().len(), 3);
}
