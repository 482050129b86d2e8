//! Extra-number request endpoints.
//!
//! - POST /api/requests - Submit a purchase-backed request (public, multipart)
//! - GET /api/requests - List requests for review (operator)
//! - POST /api/requests/:id/approve - Allocate the extra numbers (operator)
//! - POST /api/requests/:id/reject - Reject without allocation (operator)

use super::{ParticipantResponse, RequestResponse};
use crate::auth::RequireOperator;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use rifa_core::types::{Money, ProofFile, RequestId};
use serde::Serialize;
use uuid::Uuid;

/// Response after an approval: the allocated rows.
#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    /// The approved request
    pub request_id: Uuid,
    /// Allocated ticket numbers
    pub granted_numbers: Vec<u32>,
    /// The created participant rows
    pub tickets: Vec<ParticipantResponse>,
}

/// Response after a rejection.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    /// The decided request
    pub request_id: Uuid,
    /// Terminal status
    pub status: String,
}

/// All requests, newest first.
#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    /// Requests in review order
    pub requests: Vec<RequestResponse>,
    /// Total count
    pub total: usize,
}

/// Submit an extra-number request.
///
/// Public endpoint. Expects a multipart form with `name`, `contact`,
/// `amount_cents` and a `proof` file field (the payment receipt). The
/// proof is archived before the request is persisted; a storage failure
/// blocks the submission.
pub async fn submit_request(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RequestResponse>), AppError> {
    let mut name = None;
    let mut contact = None;
    let mut amount_cents: Option<u64> = None;
    let mut proof = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let Some(field_name) = field.name().map(ToString::to_string) else {
            continue;
        };
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "contact" => contact = Some(read_text(field).await?),
            "amount_cents" => {
                let text = read_text(field).await?;
                amount_cents = Some(text.trim().parse().map_err(|_| {
                    AppError::bad_request("amount_cents must be a whole number of cents")
                })?);
            }
            "proof" => {
                let file_name = field
                    .file_name()
                    .map_or_else(|| "proof.bin".to_string(), ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Unreadable proof upload: {e}")))?;
                proof = Some(ProofFile::new(file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| AppError::bad_request("Missing field: name"))?;
    let contact = contact.ok_or_else(|| AppError::bad_request("Missing field: contact"))?;
    let amount = amount_cents.ok_or_else(|| AppError::bad_request("Missing field: amount_cents"))?;
    let proof = proof.ok_or_else(|| AppError::bad_request("Missing field: proof"))?;

    let request = state
        .raffle
        .submit(&name, &contact, Money::from_cents(amount), proof)
        .await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request(format!("Unreadable multipart field: {e}")))
}

/// List every request for operator review.
pub async fn list_requests(
    _operator: RequireOperator,
    State(state): State<AppState>,
) -> Result<Json<RequestListResponse>, AppError> {
    let requests: Vec<RequestResponse> = state
        .raffle
        .list_requests()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(RequestListResponse {
        total: requests.len(),
        requests,
    }))
}

/// Approve a pending request, allocating its extra numbers.
///
/// Operator endpoint. An `INSUFFICIENT_POOL` conflict leaves the request
/// pending; the operator may retry once numbers free up.
pub async fn approve_request(
    _operator: RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalResponse>, AppError> {
    let granted = state.raffle.approve(RequestId::from_uuid(id)).await?;
    Ok(Json(ApprovalResponse {
        request_id: id,
        granted_numbers: granted.iter().map(|p| p.number.get()).collect(),
        tickets: granted.into_iter().map(Into::into).collect(),
    }))
}

/// Reject a pending request without allocating anything.
pub async fn reject_request(
    _operator: RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DecisionResponse>, AppError> {
    state.raffle.reject(RequestId::from_uuid(id)).await?;
    Ok(Json(DecisionResponse {
        request_id: id,
        status: "rejected".to_string(),
    }))
}
