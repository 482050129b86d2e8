//! Operator gating for the raffle HTTP surface.
//!
//! Provides Axum extractors for bearer token extraction and operator
//! checks. The raffle core treats operator identity as an opaque
//! predicate; this module supplies the predicate from configuration.

use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use rifa_core::providers::OperatorGate;

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::unauthorized(
                "Invalid authorization format. Expected 'Bearer <token>'",
            ));
        }

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid bearer token format"))?
            .to_string();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token))
    }
}

/// Extractor that requires an operator credential.
///
/// Use as a handler parameter to gate approve, reject, draw, remove and
/// reset behind the operator predicate.
#[derive(Debug, Clone, Copy)]
pub struct RequireOperator;

#[async_trait]
impl FromRequestParts<AppState> for RequireOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let is_operator = state
            .operator_gate
            .is_operator(&bearer.0)
            .await
            .map_err(AppError::from)?;

        if is_operator {
            Ok(Self)
        } else {
            Err(AppError::forbidden("Operator access required"))
        }
    }
}

/// Operator gate backed by a configured shared token.
#[derive(Clone, Debug)]
pub struct EnvTokenGate {
    token: String,
}

impl EnvTokenGate {
    /// Create a gate accepting `token` as the operator credential.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self { token }
    }
}

impl OperatorGate for EnvTokenGate {
    async fn is_operator(&self, credential: &str) -> rifa_core::error::Result<bool> {
        Ok(credential == self.token)
    }
}
