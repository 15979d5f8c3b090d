// core/src/error.rs
use thiserror::Error;
use uuid::Uuid;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors produced by the storage layer and the domain services.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Cart is empty. Cannot create order.")]
  EmptyCart,

  #[error("Insufficient stock for product: {product_name}. Available: {available}, Requested: {requested}")]
  InsufficientStock {
    product_id: Uuid,
    product_name: String,
    available: i32,
    requested: i32,
  },

  #[error("Database error: {0}")]
  Database(sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl StoreError {
  pub fn not_found(what: &str) -> Self {
    StoreError::NotFound(format!("{} not found.", what))
  }
}

// Known constraint violations are classified here so every caller maps them
// the same way; anything else stays a database error.
impl From<sqlx::Error> for StoreError {
  fn from(err: sqlx::Error) -> Self {
    let classified = match &err {
      sqlx::Error::RowNotFound => Some(StoreError::NotFound(
        "Record not found. It may have already been deleted.".to_string(),
      )),
      sqlx::Error::Database(db_err) => {
        let code = db_err.code().map(|c| c.into_owned());
        let constraint = db_err.constraint().unwrap_or("unknown constraint");
        match code.as_deref() {
          Some(UNIQUE_VIOLATION) => Some(StoreError::Conflict(format!(
            "Unique constraint failed on: {}",
            constraint
          ))),
          Some(FOREIGN_KEY_VIOLATION) => Some(StoreError::Validation(format!(
            "Referenced record does not exist ({}).",
            constraint
          ))),
          _ => None,
        }
      }
      _ => None,
    };
    classified.unwrap_or(StoreError::Database(err))
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Failures raised by the pipeline engine itself, as opposed to its handlers.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
