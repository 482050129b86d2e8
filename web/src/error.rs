//! Error types for web handlers.
//!
//! This module bridges the raffle error taxonomy and HTTP responses,
//! implementing Axum's `IntoResponse` trait. Conflict responses carry a
//! `details` payload so the UI can offer a recovery path (for example,
//! the rows already held by a contact) instead of a bare failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rifa_core::RaffleError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors with an HTTP status, a stable machine-readable code
/// and an optional structured details payload.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Structured payload for recovery flows (user-facing)
    details: Option<serde_json::Value>,
    /// Internal error (for logging, not exposed to client)
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            details: None,
            source: None,
        }
    }

    /// Attach a structured details payload.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message.into(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Map a domain error onto status, code and recovery payload.
impl From<RaffleError> for AppError {
    fn from(error: RaffleError) -> Self {
        match error {
            RaffleError::InvalidInput { ref reason } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                reason.clone(),
                "INVALID_INPUT".to_string(),
            ),
            RaffleError::BelowMinimumPurchase { minimum, .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error.to_string(),
                "BELOW_MINIMUM_PURCHASE".to_string(),
            )
            .with_details(serde_json::json!({ "minimum_cents": minimum.cents() })),
            RaffleError::NumberTaken { number } => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "NUMBER_TAKEN".to_string(),
            )
            .with_details(serde_json::json!({ "number": number.get() })),
            RaffleError::ContactAlreadyRegistered { ref existing } => {
                let details = serde_json::to_value(existing.as_ref()).unwrap_or_default();
                Self::new(
                    StatusCode::CONFLICT,
                    error.to_string(),
                    "CONTACT_ALREADY_REGISTERED".to_string(),
                )
                .with_details(serde_json::json!({ "existing": details }))
            }
            RaffleError::DuplicatePendingRequest { request_id } => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "DUPLICATE_PENDING_REQUEST".to_string(),
            )
            .with_details(serde_json::json!({ "request_id": request_id.as_uuid() })),
            RaffleError::InvalidState { .. } => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "INVALID_STATE".to_string(),
            ),
            RaffleError::AlreadyDrawn => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "ALREADY_DRAWN".to_string(),
            ),
            RaffleError::InsufficientPool {
                requested,
                available,
            } => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "INSUFFICIENT_POOL".to_string(),
            )
            .with_details(serde_json::json!({
                "requested": requested,
                "available": available,
            })),
            RaffleError::NoParticipants => Self::new(
                StatusCode::NOT_FOUND,
                error.to_string(),
                "NO_PARTICIPANTS".to_string(),
            ),
            RaffleError::NotFound => Self::not_found("Not found"),
            RaffleError::StoreUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Store unavailable, please retry".to_string(),
                "STORE_UNAVAILABLE".to_string(),
            )
            .with_source(anyhow::anyhow!(error)),
            RaffleError::ProofStorageFailed(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Proof storage unavailable, please retry".to_string(),
                "PROOF_STORAGE_FAILED".to_string(),
            )
            .with_source(anyhow::anyhow!(error)),
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
    /// Structured recovery payload, when the conflict carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rifa_core::types::{
        FullName, Money, Participant, ParticipantId, PhoneNumber, TicketNumber, TicketOrigin,
    };

    #[test]
    fn display_includes_the_code() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn validation_errors_map_to_422() {
        let err: AppError = RaffleError::InvalidInput {
            reason: "bad phone".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "INVALID_INPUT");

        let err: AppError = RaffleError::BelowMinimumPurchase {
            amount: Money::from_cents(100),
            minimum: Money::from_cents(700),
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn conflicts_map_to_409_with_recovery_details() {
        let existing = Participant::new(
            ParticipantId::new(),
            FullName::parse("Ana Souza").unwrap(),
            PhoneNumber::parse("11987654321").unwrap(),
            TicketNumber::new(7).unwrap(),
            TicketOrigin::Direct,
            chrono::Utc::now(),
        );
        let err: AppError = RaffleError::ContactAlreadyRegistered {
            existing: Box::new(existing),
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONTACT_ALREADY_REGISTERED");
        assert!(err.details.is_some());
    }

    #[test]
    fn store_failures_map_to_503() {
        let err: AppError = RaffleError::StoreUnavailable("timeout".to_string()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }
}
