// core/src/services/users.rs

//! Accounts: sign-up, sign-in and password hashing.

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewUser, User};
use crate::store::Store;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
  pub email: String,
  pub password: String,
}

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// Hashes a plain-text password with Argon2 and a random salt.
#[instrument(name = "users::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> StoreResult<String> {
  if password.is_empty() {
    return Err(StoreError::Validation("Password cannot be empty.".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      StoreError::Internal(format!("Password hashing failed: {}", e))
    })
}

/// `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
#[instrument(name = "users::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> StoreResult<bool> {
  let parsed = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Stored password hash could not be parsed.");
    StoreError::Internal(format!("Invalid stored password hash: {}", e))
  })?;
  match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(StoreError::Internal(format!("Password verification failed: {}", e))),
  }
}

#[instrument(name = "users::sign_up", skip(store, input), fields(email = %input.email))]
pub async fn sign_up(store: &dyn Store, input: SignUp) -> StoreResult<User> {
  let name = input.name.trim().to_string();
  let email = normalize_email(&input.email);
  if name.is_empty() {
    return Err(StoreError::Validation("Name is required.".to_string()));
  }
  if email.is_empty() || !email.contains('@') {
    return Err(StoreError::Validation("A valid email is required.".to_string()));
  }
  if input.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(StoreError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }

  if store.find_user_by_email(&email).await?.is_some() {
    warn!("Attempt to sign up with an existing email.");
    return Err(StoreError::Conflict("An account with this email already exists.".to_string()));
  }

  let password_hash = hash_password(&input.password)?;
  let user = store
    .create_user(NewUser {
      name,
      email,
      password_hash,
    })
    .await
    .map_err(|e| match e {
      StoreError::Conflict(_) => StoreError::Conflict("An account with this email already exists.".to_string()),
      other => other,
    })?;
  info!(user_id = %user.id, "User signed up.");
  Ok(user)
}

#[instrument(name = "users::sign_in", skip(store, input), fields(email = %input.email))]
pub async fn sign_in(store: &dyn Store, input: SignIn) -> StoreResult<User> {
  let invalid = || StoreError::Unauthorized("Invalid email or password.".to_string());
  let Some(user) = store.find_user_by_email(&normalize_email(&input.email)).await? else {
    debug!("No account for email.");
    return Err(invalid());
  };
  if input.password.is_empty() || !verify_password(&user.password_hash, &input.password)? {
    warn!(user_id = %user.id, "Sign-in rejected.");
    return Err(invalid());
  }
  info!(user_id = %user.id, "User signed in.");
  Ok(user)
}

pub async fn get_user(store: &dyn Store, id: Uuid) -> StoreResult<User> {
  store.find_user(id).await?.ok_or_else(|| StoreError::not_found("User"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_round_trips_and_rejects_wrong_password() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "battery staple").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(StoreError::Validation(_))));
  }

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
  }
}
