//! Aggregate reducers for the supper-club marketplace.
//!
//! This module contains all aggregate implementations:
//! - Directory: dining-event records and cook assignment
//! - Ledger: seat availability counters (the only seat writer)
//! - Collaboration: cook-to-host proposal lifecycle
//! - Booking: guest seat-request lifecycle

pub mod booking;
pub mod collaboration;
pub mod directory;
pub mod inventory;

pub use booking::{BookingAction, BookingError, BookingReducer, BookingState};
pub use collaboration::{
    CollaborationAction, CollaborationError, CollaborationReducer, CollaborationState,
};
pub use directory::{DirectoryAction, DirectoryError, DirectoryReducer, DirectoryState};
pub use inventory::{InventoryError, LedgerAction, LedgerReducer, LedgerState};
