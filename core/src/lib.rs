// core/src/lib.rs

//! Storefront core: domain models, storage backends, domain services and
//! the step-pipeline engine that the HTTP layer composes them with.
//!
//!  - [`models`]: users, catalog, carts, orders and reviews as read and written.
//!  - [`store`]: the `Store` trait family with Postgres and in-memory backends.
//!  - [`services`]: validation and business rules, including order creation.
//!  - [`pipeline`]: named steps with before/on/after handlers over shared context.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{PipelineError, StoreError, StoreResult};
pub use crate::pipeline::{ContextData, Handler, Phase, Pipeline, PipelineControl, PipelineResult, SkipCondition, StepDef, StepSpec};
pub use crate::store::{MemoryStore, PgStore, Store};
