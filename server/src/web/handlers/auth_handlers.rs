// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::services::users::{self, SignIn, SignUp};
use tracing::{info, instrument};

use super::{created, ok};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// Missing fields arrive as empty strings so the service reports which
// field is wrong instead of a generic payload error.
#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let user = users::sign_up(
    app_state.store.as_ref(),
    SignUp {
      name: payload.name,
      email: payload.email,
      password: payload.password,
    },
  )
  .await?;

  info!("Signup successful. User ID: {}", user.id);
  Ok(created("User created successfully.", user))
}

#[instrument(
    name = "handler::signin",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let user = users::sign_in(
    app_state.store.as_ref(),
    SignIn {
      email: payload.email,
      password: payload.password,
    },
  )
  .await?;

  info!("Signin successful. User ID: {}", user.id);
  Ok(ok("Signin successful.", user))
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = %auth_user.id()))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(ok("User fetched successfully.", auth_user.user))
}
