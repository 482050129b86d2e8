//! HTTP surface for the Rifa raffle subsystem.
//!
//! Exposes the public operation surface (register, lookup, submit,
//! availability, outcome) and the operator surface (approve, reject,
//! remove, draw, reset) over Axum, backed by the `PostgreSQL` store.
//! Operator identity is an opaque bearer predicate; this crate performs
//! no authentication logic beyond consulting it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod proofs;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::{AppRaffle, AppState};
