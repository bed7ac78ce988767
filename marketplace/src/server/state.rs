//! Application state for the marketplace HTTP server.

use crate::app::MarketplaceService;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. All domain operations go
/// through the [`MarketplaceService`]; handlers never touch an aggregate
/// store directly.
#[derive(Clone)]
pub struct AppState {
    /// The marketplace service composing the aggregate stores
    pub service: Arc<MarketplaceService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(service: Arc<MarketplaceService>) -> Self {
        Self { service }
    }
}
