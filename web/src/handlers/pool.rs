//! Pool availability endpoints (read side).
//!
//! - GET /api/pool - Claimed numbers and remaining capacity (public)
//!
//! Served from a committed read snapshot; the write path never trusts
//! this view for uniqueness decisions.

use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// Pool availability snapshot.
#[derive(Debug, Serialize)]
pub struct PoolStatusResponse {
    /// Total numbers in the pool
    pub pool_size: u32,
    /// Claimed numbers, ascending
    pub claimed: Vec<u32>,
    /// Numbers still available
    pub remaining: u32,
    /// Participant rows so far (progress indicator)
    pub participant_count: u64,
}

/// Get the claimed-number set and progress counters.
pub async fn get_pool_status(
    State(state): State<AppState>,
) -> Result<Json<PoolStatusResponse>, AppError> {
    let status = state.raffle.pool_status().await?;
    let participant_count = state.raffle.participant_count().await?;

    Ok(Json(PoolStatusResponse {
        pool_size: status.pool_size,
        remaining: status.remaining(),
        claimed: status.claimed.iter().map(|n| n.get()).collect(),
        participant_count,
    }))
}
