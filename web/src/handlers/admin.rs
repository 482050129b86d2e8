//! Operator administration endpoints.
//!
//! - POST /api/reset - Wipe the cycle back to its initial state (operator)

use crate::auth::RequireOperator;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Reset the raffle cycle.
///
/// Operator endpoint. Clears participants, requests and the draw outcome
/// atomically, then deletes stored proof artifacts best effort.
pub async fn reset_cycle(
    _operator: RequireOperator,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.raffle.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}
