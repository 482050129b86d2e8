//! Router configuration for the raffle server.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::{admin, draw, health, participants, pool, requests};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build the complete Axum router.
///
/// Public surface: registration, contact lookup, pool availability,
/// request submission and the outcome display. Operator surface (bearer
/// gated): request review and decisions, row removal, draw, reset.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Participant registry
        .route("/participants", post(participants::register))
        .route("/participants", get(participants::lookup_by_contact))
        .route("/participants/:id", delete(participants::remove_participant))
        // Extra-number workflow
        .route("/requests", post(requests::submit_request))
        .route("/requests", get(requests::list_requests))
        .route("/requests/:id/approve", post(requests::approve_request))
        .route("/requests/:id/reject", post(requests::reject_request))
        // Draw
        .route("/draw", post(draw::run_draw))
        .route("/draw", get(draw::get_outcome))
        // Availability (read side)
        .route("/pool", get(pool::get_pool_status))
        // Cycle administration
        .route("/reset", post(admin::reset_cycle));

    Router::new()
        // Health check (no authentication)
        .route("/health", get(health::health_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
