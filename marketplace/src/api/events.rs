//! Event management and catalog endpoints.
//!
//! - POST /api/events - host publishes an event
//! - GET  /api/events - guest-visible catalog
//! - GET  /api/events/mine - the calling host's own events
//! - GET  /api/events/:id - single event record
//! - POST /api/events/:id/cancel - cancel an event
//! - GET  /api/events/:id/availability - seat availability

use crate::app::{CatalogEntry, NewEvent};
use crate::server::{AppError, AppState, Caller};
use crate::types::EventId;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

/// Seat availability for one event.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Event ID
    pub event_id: Uuid,
    /// Total seats offered
    pub seats_total: u32,
    /// Seats still available
    pub seats_left: u32,
}

/// Publish a new event.
///
/// Host-only. Every seat starts available.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events \
///   -H 'x-caller-id: 3e9a...' -H 'x-caller-role: host' \
///   -d '{"title":"Nonna'\''s table","cuisine":"Italian",...,"seats_total":8}'
/// ```
pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<NewEvent>,
) -> Result<Json<CatalogEntry>, AppError> {
    let host_id = caller.as_host()?;
    let entry = state.service.create_event(host_id, payload).await?;
    Ok(Json(entry))
}

/// List the guest-visible catalog.
///
/// Public to any authenticated caller. Visibility is recomputed on every
/// request from the current collaborations.
pub async fn list_visible_events(
    State(state): State<AppState>,
    _caller: Caller,
) -> Json<Vec<CatalogEntry>> {
    Json(state.service.visible_events().await)
}

/// List the calling host's own events, published or not.
pub async fn list_host_events(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let host_id = caller.as_host()?;
    Ok(Json(state.service.events_for_host(host_id).await))
}

/// Fetch a single event record with its seat counter.
pub async fn get_event(
    State(state): State<AppState>,
    _caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<CatalogEntry>, AppError> {
    let event_id = EventId::from_uuid(event_id);
    state
        .service
        .event(event_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Event", event_id))
}

/// Cancel an event.
///
/// Host-only; the record and counter remain, flagged cancelled.
pub async fn cancel_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let host_id = caller.as_host()?;
    state
        .service
        .cancel_event(host_id, EventId::from_uuid(event_id))
        .await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

/// Get seat availability for an event.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events/550e8400-.../availability \
///   -H 'x-caller-id: ...' -H 'x-caller-role: guest'
/// # {"event_id":"550e8400-...","seats_total":8,"seats_left":3}
/// ```
pub async fn get_availability(
    State(state): State<AppState>,
    _caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let counter = state
        .service
        .availability(EventId::from_uuid(event_id))
        .await?;
    Ok(Json(AvailabilityResponse {
        event_id,
        seats_total: counter.seats_total,
        seats_left: counter.seats_left,
    }))
}
