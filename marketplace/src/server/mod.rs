//! HTTP server for the marketplace.

mod error;
mod health;
mod identity;
mod routes;
mod state;

pub use error::AppError;
pub use health::{health_check, readiness_check};
pub use identity::Caller;
pub use routes::build_router;
pub use state::AppState;
