// core/src/services/mod.rs

//! Domain operations over a [`Store`](crate::store::Store).
//!
//! Every function takes the store as `&dyn Store` so the same logic runs on
//! Postgres and on the in-memory backend.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payment;
pub mod reviews;
pub mod seed;
pub mod users;
