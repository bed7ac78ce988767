//! Seat ledger aggregate: the single source of truth for seat counters.
//!
//! Owns `seats_left` per event and is the only component allowed to mutate
//! it. `Reserve` is a conditional decrement evaluated inside one `reduce`
//! call, i.e. under the owning store's write lock - two racing
//! reservations against the last seat resolve to exactly one winner. A
//! read dispatch followed by a write dispatch would reintroduce the
//! lost-update race and must never be used here.
//!
//! The ledger never creates or mutates seat-request records; that is the
//! marketplace service's job, keeping this aggregate a pure counter with
//! one rule: never go negative, never exceed total.

use crate::types::{EventId, SeatCounter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use supperclub_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Rejections produced by the seat ledger
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryError {
    /// No seats remain for the event
    #[error("event {0} is sold out")]
    SoldOut(EventId),

    /// No counter has been opened for the event
    #[error("no seat inventory exists for event {0}")]
    UnknownEvent(EventId),

    /// A counter already exists for the event
    #[error("seat inventory for event {0} already exists")]
    AlreadyOpen(EventId),

    /// Capacity must be positive
    #[error("seats_total must be greater than zero")]
    ZeroCapacity,
}

// ============================================================================
// State
// ============================================================================

/// State for the seat ledger reducer
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    /// Seat counters indexed by event
    counters: HashMap<EventId, SeatCounter>,
    /// Rejection recorded by the most recent dispatch, if any
    ///
    /// Read under the same write lock as the dispatch (via
    /// `Store::send_and_read`), so it always refers to the command that
    /// was just reduced.
    pub last_error: Option<InventoryError>,
}

impl LedgerState {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the counter for an event
    #[must_use]
    pub fn counter(&self, event_id: &EventId) -> Option<&SeatCounter> {
        self.counters.get(event_id)
    }

    /// Seats still available for an event
    #[must_use]
    pub fn seats_left(&self, event_id: &EventId) -> Option<u32> {
        self.counters.get(event_id).map(|c| c.seats_left)
    }

    /// Number of counters opened
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no counters have been opened
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the seat ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LedgerAction {
    // Commands
    /// Open a counter for a newly created event
    Open {
        /// Event to open inventory for
        event_id: EventId,
        /// Total capacity
        seats_total: u32,
    },

    /// Take one seat if any remain
    Reserve {
        /// Event to reserve against
        event_id: EventId,
    },

    /// Return one seat, clamped at total capacity
    Release {
        /// Event to release to
        event_id: EventId,
    },

    // Events
    /// A counter was opened
    InventoryOpened {
        /// Event the counter belongs to
        event_id: EventId,
        /// Total capacity
        seats_total: u32,
        /// When opened
        opened_at: DateTime<Utc>,
    },

    /// One seat was taken
    SeatHeld {
        /// Event the seat belongs to
        event_id: EventId,
        /// Seats remaining after the hold
        seats_left: u32,
        /// When held
        held_at: DateTime<Utc>,
    },

    /// One seat was returned
    SeatFreed {
        /// Event the seat belongs to
        event_id: EventId,
        /// Seats remaining after the release
        seats_left: u32,
        /// When freed
        freed_at: DateTime<Utc>,
    },

    /// A command was rejected
    LedgerRejected {
        /// Why the command was rejected
        error: InventoryError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the seat ledger
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl LedgerEnvironment {
    /// Creates a new `LedgerEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the seat ledger
#[derive(Clone, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    /// Creates a new `LedgerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    fn apply_event(state: &mut LedgerState, action: &LedgerAction) {
        match action {
            LedgerAction::InventoryOpened {
                event_id,
                seats_total,
                ..
            } => {
                state
                    .counters
                    .insert(*event_id, SeatCounter::new(*seats_total));
                state.last_error = None;
            },

            LedgerAction::SeatHeld { .. } | LedgerAction::SeatFreed { .. } => {
                // Counter already mutated when the event was produced
                state.last_error = None;
            },

            LedgerAction::LedgerRejected { error } => {
                state.last_error = Some(error.clone());
            },

            // Commands are not applied to state
            LedgerAction::Open { .. }
            | LedgerAction::Reserve { .. }
            | LedgerAction::Release { .. } => {},
        }
    }
}

impl Reducer for LedgerReducer {
    type State = LedgerState;
    type Action = LedgerAction;
    type Environment = LedgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            LedgerAction::Open {
                event_id,
                seats_total,
            } => {
                if seats_total == 0 {
                    Self::apply_event(
                        state,
                        &LedgerAction::LedgerRejected {
                            error: InventoryError::ZeroCapacity,
                        },
                    );
                    return SmallVec::new();
                }

                if state.counters.contains_key(&event_id) {
                    Self::apply_event(
                        state,
                        &LedgerAction::LedgerRejected {
                            error: InventoryError::AlreadyOpen(event_id),
                        },
                    );
                    return SmallVec::new();
                }

                let event = LedgerAction::InventoryOpened {
                    event_id,
                    seats_total,
                    opened_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            LedgerAction::Reserve { event_id } => {
                // Conditional decrement: check and mutate in one critical
                // section. The sold-out check and the decrement must not
                // be split across dispatches.
                let Some(counter) = state.counters.get_mut(&event_id) else {
                    Self::apply_event(
                        state,
                        &LedgerAction::LedgerRejected {
                            error: InventoryError::UnknownEvent(event_id),
                        },
                    );
                    return SmallVec::new();
                };

                if !counter.reserve() {
                    tracing::debug!(%event_id, "reservation rejected: sold out");
                    Self::apply_event(
                        state,
                        &LedgerAction::LedgerRejected {
                            error: InventoryError::SoldOut(event_id),
                        },
                    );
                    return SmallVec::new();
                }

                let event = LedgerAction::SeatHeld {
                    event_id,
                    seats_left: counter.seats_left,
                    held_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            LedgerAction::Release { event_id } => {
                let Some(counter) = state.counters.get_mut(&event_id) else {
                    Self::apply_event(
                        state,
                        &LedgerAction::LedgerRejected {
                            error: InventoryError::UnknownEvent(event_id),
                        },
                    );
                    return SmallVec::new();
                };

                counter.release();

                let event = LedgerAction::SeatFreed {
                    event_id,
                    seats_left: counter.seats_left,
                    freed_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            // ========== Events ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            },
        }
    }
}
