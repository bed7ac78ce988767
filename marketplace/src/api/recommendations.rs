//! Recommendation endpoint.
//!
//! - POST /api/recommendations - rank the visible catalog for a guest
//!
//! The response shape is identical whether the external ranking service
//! or the local deterministic fallback produced it.

use crate::recommendations::RecommendationsResponse;
use crate::server::{AppError, AppState, Caller};
use axum::{Json, extract::State};
use serde::Deserialize;

/// Payload for a recommendation request.
#[derive(Debug, Deserialize)]
pub struct RecommendPayload {
    /// The guest's declared interests (cuisine tags, case-insensitive)
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Rank the visible catalog against the caller's interests.
///
/// Never fails on empty interests or an empty catalog; ranking-service
/// outages silently fall back to local scoring.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/recommendations \
///   -H 'x-caller-id: ...' -H 'x-caller-role: guest' \
///   -d '{"interests":["Italian"]}'
/// # {"recommendations":[{"id":"...","reason":"This Italian event ..."}]}
/// ```
pub async fn recommend(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<RecommendPayload>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let _guest = caller.as_guest()?;
    Ok(Json(state.service.recommendations(&payload.interests).await))
}
