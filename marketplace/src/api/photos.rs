//! Photo search endpoint.
//!
//! - GET /api/photos?query=...&per_page=... - stock-photo search
//!
//! Provider failures surface as an empty list, never an error.

use crate::media::PhotoSearchResponse;
use crate::server::{AppState, Caller};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

/// Query parameters for photo search.
#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    /// Search query
    #[serde(default = "default_query")]
    pub query: String,
    /// Page size
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_query() -> String {
    "food".to_string()
}

const fn default_per_page() -> u32 {
    15
}

/// Search stock photos for event imagery.
pub async fn search(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<PhotoQuery>,
) -> Json<PhotoSearchResponse> {
    Json(
        state
            .service
            .search_photos(&params.query, params.per_page)
            .await,
    )
}
