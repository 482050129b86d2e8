//! Participant registry endpoints.
//!
//! - POST /api/participants - Claim a ticket number (public)
//! - GET /api/participants?contact= - Every ticket held by a contact (public)
//! - DELETE /api/participants/:id - Remove one row (operator)

use super::ParticipantResponse;
use crate::auth::RequireOperator;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rifa_core::types::ParticipantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to claim a ticket number.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Participant full name (at least two words)
    pub name: String,
    /// Phone contact identity
    pub contact: String,
    /// Chosen ticket number
    pub number: u32,
}

/// Lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    /// Phone contact identity
    pub contact: String,
}

/// Tickets held by one contact.
#[derive(Debug, Serialize)]
pub struct ContactTicketsResponse {
    /// Rows owned by the contact
    pub tickets: Vec<ParticipantResponse>,
    /// Number of rows
    pub total: usize,
}

/// Claim a ticket number.
///
/// Public endpoint. Conflict responses carry recovery data: a taken
/// number reports which one, a registered contact returns its existing
/// row so the UI can offer account recovery.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>), AppError> {
    let participant = state
        .raffle
        .register(&request.name, &request.contact, request.number)
        .await?;
    Ok((StatusCode::CREATED, Json(participant.into())))
}

/// Every ticket held by a contact (base registration plus extras).
///
/// Public endpoint used by the "my numbers" view.
pub async fn lookup_by_contact(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<ContactTicketsResponse>, AppError> {
    let rows = state.raffle.lookup_by_contact(&params.contact).await?;
    let tickets: Vec<ParticipantResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ContactTicketsResponse {
        total: tickets.len(),
        tickets,
    }))
}

/// Remove one participant row.
///
/// Operator endpoint; the freed number becomes claimable again.
pub async fn remove_participant(
    _operator: RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .raffle
        .remove(ParticipantId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
