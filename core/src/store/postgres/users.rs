// core/src/store/postgres/users.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::error::StoreResult;
use crate::models::{NewUser, User};
use crate::store::UserStore;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

#[async_trait]
impl UserStore for PgStore {
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .fetch_one(&self.pool)
    .await?;
    Ok(user)
  }

  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }
}
