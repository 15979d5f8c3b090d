// server/src/web/extractors.rs

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use storefront::models::User;
use storefront::store::UserStore;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// The caller identified by the mock `X-User-ID` header. The header must
/// carry the id of an existing user; anything else is a 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl AuthenticatedUser {
  pub fn id(&self) -> Uuid {
    self.user.id
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let header = req
      .headers()
      .get(USER_ID_HEADER)
      .map(|value| value.to_str().map(|s| s.trim().to_string()));

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

      let raw = match header {
        Some(Ok(raw)) if !raw.is_empty() => raw,
        _ => {
          warn!("AuthenticatedUser extractor: Missing X-User-ID header.");
          return Err(AppError::Auth(
            "User authentication required. Missing X-User-ID header.".to_string(),
          ));
        }
      };
      let user_id = Uuid::parse_str(&raw).map_err(|_| {
        warn!(header = %raw, "AuthenticatedUser extractor: Malformed X-User-ID header.");
        AppError::Auth("Invalid X-User-ID header.".to_string())
      })?;

      match app_state.store.find_user(user_id).await? {
        Some(user) => Ok(AuthenticatedUser { user }),
        None => {
          warn!(%user_id, "AuthenticatedUser extractor: Unknown user.");
          Err(AppError::Auth("User not found for the supplied X-User-ID.".to_string()))
        }
      }
    })
  }
}
