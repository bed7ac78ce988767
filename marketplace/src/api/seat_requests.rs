//! Seat-request endpoints.
//!
//! - POST /api/seat-requests - guest requests a seat
//! - GET  /api/seat-requests/mine - the calling guest's requests
//! - GET  /api/events/:id/seat-requests - requests for a host's event
//! - POST /api/seat-requests/:id/approve - host approves
//! - POST /api/seat-requests/:id/waitlist - host waitlists (frees the seat)
//! - POST /api/seat-requests/:id/decline - host declines (frees the seat)

use crate::server::{AppError, AppState, Caller};
use crate::types::{EventId, SeatRequest, SeatRequestId};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

/// Payload for requesting a seat.
#[derive(Debug, Deserialize)]
pub struct SeatRequestPayload {
    /// Target event
    pub event_id: Uuid,
    /// Optional note to the host
    pub note: Option<String>,
}

/// Request one seat at an event.
///
/// Guest-only. The seat is held immediately: a sold-out event rejects
/// with `SOLD_OUT` before any request record is created, and a duplicate
/// active request rejects with `ALREADY_REQUESTED` after the held seat
/// has been returned.
pub async fn request_seat(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<SeatRequestPayload>,
) -> Result<Json<SeatRequest>, AppError> {
    let guest_id = caller.as_guest()?;
    let request = state
        .service
        .request_seat(guest_id, EventId::from_uuid(payload.event_id), payload.note)
        .await?;
    Ok(Json(request))
}

/// List the calling guest's seat requests.
pub async fn list_for_guest(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<SeatRequest>>, AppError> {
    let guest_id = caller.as_guest()?;
    Ok(Json(state.service.seat_requests_for_guest(guest_id).await))
}

/// List seat requests for an event the caller hosts.
pub async fn list_for_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<SeatRequest>>, AppError> {
    let host_id = caller.as_host()?;
    let requests = state
        .service
        .seat_requests_for_event(host_id, EventId::from_uuid(event_id))
        .await?;
    Ok(Json(requests))
}

/// Approve a pending request; the held seat stays confirmed.
pub async fn approve(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatRequest>, AppError> {
    let host_id = caller.as_host()?;
    let request = state
        .service
        .approve_seat(host_id, SeatRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}

/// Waitlist a pending request; the held seat returns to availability.
pub async fn waitlist(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatRequest>, AppError> {
    let host_id = caller.as_host()?;
    let request = state
        .service
        .waitlist_seat(host_id, SeatRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}

/// Decline a pending request; the held seat returns to availability.
pub async fn decline(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatRequest>, AppError> {
    let host_id = caller.as_host()?;
    let request = state
        .service
        .decline_seat(host_id, SeatRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}
