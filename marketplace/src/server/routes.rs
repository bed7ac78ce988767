//! Router configuration for the marketplace server.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{collaborations, events, photos, recommendations, seat_requests};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Event management and catalog endpoints
/// - Collaboration endpoints
/// - Seat-request endpoints
/// - Recommendations and photo search
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Events
        .route("/events", post(events::create_event))
        .route("/events", get(events::list_visible_events))
        .route("/events/mine", get(events::list_host_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/cancel", post(events::cancel_event))
        .route("/events/:id/availability", get(events::get_availability))
        .route(
            "/events/:id/seat-requests",
            get(seat_requests::list_for_event),
        )
        // Collaborations
        .route("/collaborations", post(collaborations::propose))
        .route("/collaborations", get(collaborations::list_for_caller))
        .route("/collaborations/:id/accept", post(collaborations::accept))
        .route("/collaborations/:id/decline", post(collaborations::decline))
        // Seat requests
        .route("/seat-requests", post(seat_requests::request_seat))
        .route("/seat-requests/mine", get(seat_requests::list_for_guest))
        .route("/seat-requests/:id/approve", post(seat_requests::approve))
        .route("/seat-requests/:id/waitlist", post(seat_requests::waitlist))
        .route("/seat-requests/:id/decline", post(seat_requests::decline))
        // Recommendations + photos
        .route("/recommendations", post(recommendations::recommend))
        .route("/photos", get(photos::search));

    Router::new()
        // Health checks (no identity required)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
