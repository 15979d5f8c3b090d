// server/src/lib.rs

//! HTTP layer of the storefront: configuration, application state, the
//! error-to-response translation, the workflow pipelines and the actix-web
//! route table.

pub mod config;
pub mod errors;
pub mod pipelines;
pub mod state;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::AppError;
pub use crate::state::AppState;
pub use crate::web::configure_app_routes;
