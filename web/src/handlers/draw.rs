//! Draw endpoints.
//!
//! - POST /api/draw - Run the draw (operator, irreversible)
//! - GET /api/draw - Current outcome, if drawn (public)

use super::ParticipantResponse;
use crate::auth::RequireOperator;
use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The draw result.
#[derive(Debug, Serialize)]
pub struct DrawResponse {
    /// The winning row
    pub winner: ParticipantResponse,
    /// When the draw happened
    pub drawn_at: DateTime<Utc>,
}

/// Current outcome of the cycle.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    /// Whether the cycle has been drawn
    pub drawn: bool,
    /// The winning row, when drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<ParticipantResponse>,
    /// When the draw happened, when drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_at: Option<DateTime<Utc>>,
}

/// Run the draw.
///
/// Operator endpoint; succeeds at most once per cycle. A second call
/// returns an `ALREADY_DRAWN` conflict.
pub async fn run_draw(
    _operator: RequireOperator,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DrawResponse>), AppError> {
    let winner = state.raffle.draw().await?;
    let drawn_at = state
        .raffle
        .outcome()
        .await?
        .map_or_else(Utc::now, |outcome| outcome.drawn_at);

    Ok((
        StatusCode::CREATED,
        Json(DrawResponse {
            winner: winner.into(),
            drawn_at,
        }),
    ))
}

/// The current outcome, for the result display.
pub async fn get_outcome(
    State(state): State<AppState>,
) -> Result<Json<OutcomeResponse>, AppError> {
    let response = match state.raffle.winner().await? {
        Some((outcome, winner)) => OutcomeResponse {
            drawn: true,
            winner: Some(winner.into()),
            drawn_at: Some(outcome.drawn_at),
        },
        None => OutcomeResponse {
            drawn: false,
            winner: None,
            drawn_at: None,
        },
    };
    Ok(Json(response))
}
