//! HTTP API handlers for the marketplace.
//!
//! Handlers are thin: they extract the caller identity, delegate to the
//! marketplace service, and map domain rejections onto HTTP statuses via
//! [`crate::server::AppError`].

pub mod collaborations;
pub mod events;
pub mod photos;
pub mod recommendations;
pub mod seat_requests;
