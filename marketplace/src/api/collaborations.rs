//! Collaboration endpoints.
//!
//! - POST /api/collaborations - cook proposes a collaboration
//! - GET  /api/collaborations - proposals involving the caller
//! - POST /api/collaborations/:id/accept - target host accepts
//! - POST /api/collaborations/:id/decline - target host declines

use crate::app::NewCollaboration;
use crate::server::{AppError, AppState, Caller};
use crate::types::{CollaborationId, CollaborationRequest, Role};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// Propose a collaboration.
///
/// Cook-only. The proposal may target a specific event or just the host.
pub async fn propose(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<NewCollaboration>,
) -> Result<Json<CollaborationRequest>, AppError> {
    let cook_id = caller.as_cook()?;
    let request = state.service.propose_collaboration(cook_id, payload).await?;
    Ok(Json(request))
}

/// List proposals involving the caller.
///
/// Hosts see proposals addressed to them; cooks see proposals they sent.
pub async fn list_for_caller(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CollaborationRequest>>, AppError> {
    let requests = match caller.role {
        Role::Host => {
            state
                .service
                .collaborations_for_host(caller.as_host()?)
                .await
        },
        Role::Cook => {
            state
                .service
                .collaborations_for_cook(caller.as_cook()?)
                .await
        },
        Role::Guest => {
            return Err(AppError::forbidden(
                "collaborations involve hosts and cooks only",
            ));
        },
    };
    Ok(Json(requests))
}

/// Accept a proposal.
///
/// Only the target host may accept. On success the proposing cook is
/// assigned to the target event and it becomes eligible for the guest
/// catalog.
pub async fn accept(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CollaborationRequest>, AppError> {
    let host_id = caller.as_host()?;
    let request = state
        .service
        .accept_collaboration(host_id, CollaborationId::from_uuid(id))
        .await?;
    Ok(Json(request))
}

/// Decline a proposal.
///
/// Only the target host may decline. Declining never mutates any event.
pub async fn decline(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CollaborationRequest>, AppError> {
    let host_id = caller.as_host()?;
    let request = state
        .service
        .decline_collaboration(host_id, CollaborationId::from_uuid(id))
        .await?;
    Ok(Json(request))
}
