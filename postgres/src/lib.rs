//! `PostgreSQL` raffle store for Rifa.
//!
//! This crate implements the `RaffleStore` trait from `rifa-core` on top of
//! sqlx. Every serialization point of the subsystem is carried by the
//! database: uniqueness through constraints checked at commit time, the
//! approve workflow through a row-locked transaction, the at-most-one draw
//! through a single-row guard, and the cycle reset through one `TRUNCATE`.
//!
//! # Example
//!
//! ```no_run
//! use rifa_postgres::PostgresRaffleStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresRaffleStore::connect("postgres://localhost/rifa").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod store;

pub use store::PostgresRaffleStore;
