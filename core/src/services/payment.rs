// core/src/services/payment.rs

//! Simulated payment authorization. No processor is contacted: a non-blank
//! confirmation token counts as a successful payment.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{StoreError, StoreResult};

pub const SIMULATED_SUCCESS: &str = "SIMULATED_SUCCESS";

/// Result stored on the order as `paymentResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
  pub token: String,
  pub status: String,
}

impl PaymentReceipt {
  pub fn to_json(&self) -> Value {
    serde_json::json!({ "token": self.token, "status": self.status })
  }
}

#[instrument(name = "payment::authorize", skip(token))]
pub fn authorize(payment_method: &str, token: &str, amount_cents: i64) -> StoreResult<PaymentReceipt> {
  if token.trim().is_empty() {
    return Err(StoreError::Validation("Payment token is required.".to_string()));
  }
  if amount_cents < 0 {
    return Err(StoreError::Validation("Payment amount cannot be negative.".to_string()));
  }
  info!("Simulated payment authorized.");
  Ok(PaymentReceipt {
    token: token.to_string(),
    status: SIMULATED_SUCCESS.to_string(),
  })
}
