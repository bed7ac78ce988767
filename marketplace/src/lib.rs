//! Supper-club marketplace - a three-sided marketplace backend
//!
//! Connects venue **hosts**, **cooks**, and **guests** around dining
//! events. The engineering core is the event visibility, collaboration
//! matching, and seat-inventory lifecycle, plus a deterministic
//! recommendation ranker.
//!
//! # Architecture
//!
//! ```text
//! Write side (reducer stores, one write lock each):
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │    Event     │  │     Seat     │  │Collaboration │  │ Seat-request │
//! │  Directory   │  │    Ledger    │  │   Matcher    │  │   Lifecycle  │
//! └──────────────┘  └──────────────┘  └──────────────┘  └──────────────┘
//!        │                 │                  │                  │
//!        └─────────────────┴────────┬─────────┴──────────────────┘
//!                                   │
//!                          ┌────────▼────────┐
//!                          │   Marketplace   │   compensation lives here:
//!                          │     service     │   a held seat is released on
//!                          └────────┬────────┘   any downstream failure
//!                                   │
//! Read side (recomputed per read, never cached):
//! ┌──────────────┐  ┌──────────────┐
//! │    Guest     │  │Recommendation│
//! │   catalog    │  │    ranker    │
//! └──────────────┘  └──────────────┘
//! ```
//!
//! # Key invariants
//!
//! - `0 ≤ seats_left ≤ seats_total` for every event, after any sequence of
//!   reserve/release operations.
//! - Collaboration and seat-request statuses are monotonic: once a request
//!   leaves `pending` it never transitions again.
//! - Reserving the last seat is a conditional decrement applied inside one
//!   reducer call; two racing reservations can never both succeed.
//! - An event is guest-visible iff a cook is assigned *and* a matching
//!   accepted collaboration exists - evaluated fresh on every read.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod media;
pub mod recommendations;
pub mod server;
pub mod types;

pub use aggregates::{
    BookingAction, BookingReducer, CollaborationAction, CollaborationReducer, DirectoryAction,
    DirectoryReducer, LedgerAction, LedgerReducer,
};
pub use app::MarketplaceService;
pub use config::Config;
pub use types::*;
