// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use storefront::{PipelineError, StoreError};
use thiserror::Error;

// Set once at startup from APP_ENV; 5xx bodies carry `detail` only while set.
static EXPOSE_ERROR_DETAIL: AtomicBool = AtomicBool::new(true);

pub fn expose_error_detail(expose: bool) {
  EXPOSE_ERROR_DETAIL.store(expose, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: PipelineError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // A pipeline stopped before producing the value the handler needs.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
  status: &'static str,
  status_code: u16,
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  detail: Option<String>,
}

fn store_status(err: &StoreError) -> StatusCode {
  match err {
    StoreError::Validation(_) | StoreError::EmptyCart | StoreError::InsufficientStock { .. } => {
      StatusCode::BAD_REQUEST
    }
    StoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
    StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
    StoreError::Conflict(_) => StatusCode::CONFLICT,
    StoreError::Database(_) | StoreError::Migration(_) | StoreError::Internal(_) => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Store(err) => store_status(err),
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) | AppError::PipelineHaltedByHandler => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let body = if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
      ErrorBody {
        status: "error",
        status_code: status.as_u16(),
        message: "Internal Server Error".to_string(),
        detail: EXPOSE_ERROR_DETAIL
          .load(Ordering::Relaxed)
          .then(|| format!("{:?}", self)),
      }
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
      ErrorBody {
        status: "error",
        status_code: status.as_u16(),
        message: self.to_string(),
        detail: None,
      }
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
