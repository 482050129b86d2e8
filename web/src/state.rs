//! Application state for the raffle HTTP server.

use crate::auth::EnvTokenGate;
use crate::notify::TracingNotifier;
use crate::proofs::FsProofStorage;
use rifa_core::Raffle;
use rifa_core::providers::SystemClock;
use rifa_postgres::PostgresRaffleStore;

/// The production raffle service wiring.
pub type AppRaffle = Raffle<PostgresRaffleStore, FsProofStorage, TracingNotifier, SystemClock>;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply, every member is pool- or Arc-backed) for each request.
#[derive(Clone)]
pub struct AppState {
    /// The raffle service.
    pub raffle: AppRaffle,
    /// Operator gate consulted by the `RequireOperator` extractor.
    pub operator_gate: EnvTokenGate,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(raffle: AppRaffle, operator_gate: EnvTokenGate) -> Self {
        Self {
            raffle,
            operator_gate,
        }
    }
}
