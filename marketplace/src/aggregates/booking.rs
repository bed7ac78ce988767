//! Booking aggregate: the guest seat-request lifecycle.
//!
//! State machine per request: `pending -> approved`, `pending ->
//! waitlisted`, or `pending -> declined`; all three outcomes are terminal
//! and a waitlisted guest is not re-promoted automatically. Status is
//! re-checked inside `reduce` (under the store write lock), so two
//! concurrent decisions on the same request resolve to exactly one winner
//! and the loser observes `InvalidTransition`.
//!
//! This aggregate only owns the request records. The paired seat-counter
//! mutations (a hold when a request is submitted, a release when it is
//! waitlisted or declined) are driven by the marketplace service against
//! the seat ledger.

use crate::types::{EventId, GuestId, SeatRequest, SeatRequestId, SeatRequestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use supperclub_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Rejections produced by the booking aggregate
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    /// No request with this identifier
    #[error("seat request {0} not found")]
    UnknownRequest(SeatRequestId),

    /// The guest already holds a pending or approved request for the event
    #[error("guest already has an active seat request for event {0}")]
    AlreadyRequested(EventId),

    /// The request has already been decided
    #[error("seat request {0} is already {1}")]
    InvalidTransition(SeatRequestId, SeatRequestStatus),

    /// A request with this identifier already exists
    #[error("seat request {0} already exists")]
    DuplicateRequest(SeatRequestId),
}

// ============================================================================
// State
// ============================================================================

/// State for the booking reducer
#[derive(Clone, Debug, Default)]
pub struct BookingState {
    /// All seat requests indexed by id
    requests: HashMap<SeatRequestId, SeatRequest>,
    /// Rejection recorded by the most recent dispatch, if any
    pub last_error: Option<BookingError>,
}

impl BookingState {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a request by id
    #[must_use]
    pub fn get(&self, id: &SeatRequestId) -> Option<&SeatRequest> {
        self.requests.get(id)
    }

    /// The guest's pending or approved request for an event, if any
    #[must_use]
    pub fn active_request(&self, event_id: &EventId, guest_id: &GuestId) -> Option<&SeatRequest> {
        self.requests.values().find(|r| {
            r.event_id == *event_id && r.guest_id == *guest_id && r.status.holds_seat()
        })
    }

    /// All requests for an event
    #[must_use]
    pub fn for_event(&self, event_id: &EventId) -> Vec<&SeatRequest> {
        self.requests
            .values()
            .filter(|r| r.event_id == *event_id)
            .collect()
    }

    /// All requests made by a guest
    #[must_use]
    pub fn for_guest(&self, guest_id: &GuestId) -> Vec<&SeatRequest> {
        self.requests
            .values()
            .filter(|r| r.guest_id == *guest_id)
            .collect()
    }

    /// Number of requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no requests exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the booking aggregate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BookingAction {
    // Commands
    /// Record a guest's seat request (the seat is already held)
    Submit {
        /// Request identifier (generated by the caller)
        id: SeatRequestId,
        /// Target event
        event_id: EventId,
        /// Requesting guest
        guest_id: GuestId,
        /// Optional note to the host
        note: Option<String>,
    },

    /// Approve a pending request; the held seat is confirmed
    Approve {
        /// Request to approve
        id: SeatRequestId,
    },

    /// Waitlist a pending request; the caller releases the held seat
    Waitlist {
        /// Request to waitlist
        id: SeatRequestId,
    },

    /// Decline a pending request; the caller releases the held seat
    Decline {
        /// Request to decline
        id: SeatRequestId,
    },

    // Events
    /// A seat request was recorded
    SeatRequested {
        /// The full request record
        request: SeatRequest,
    },

    /// A request was approved
    SeatRequestApproved {
        /// Request id
        id: SeatRequestId,
        /// When approved
        approved_at: DateTime<Utc>,
    },

    /// A request was waitlisted
    SeatRequestWaitlisted {
        /// Request id
        id: SeatRequestId,
        /// Event whose seat must be released
        event_id: EventId,
        /// When waitlisted
        waitlisted_at: DateTime<Utc>,
    },

    /// A request was declined
    SeatRequestDeclined {
        /// Request id
        id: SeatRequestId,
        /// Event whose seat must be released
        event_id: EventId,
        /// When declined
        declined_at: DateTime<Utc>,
    },

    /// A command was rejected
    BookingRejected {
        /// Why the command was rejected
        error: BookingError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the booking aggregate
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking aggregate
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Submit` command
    fn validate_submit(
        state: &BookingState,
        id: &SeatRequestId,
        event_id: &EventId,
        guest_id: &GuestId,
    ) -> Result<(), BookingError> {
        if state.requests.contains_key(id) {
            return Err(BookingError::DuplicateRequest(*id));
        }

        if state.active_request(event_id, guest_id).is_some() {
            return Err(BookingError::AlreadyRequested(*event_id));
        }

        Ok(())
    }

    /// Validates that a request exists and is still pending
    fn validate_pending(
        state: &BookingState,
        id: &SeatRequestId,
    ) -> Result<(), BookingError> {
        let Some(request) = state.requests.get(id) else {
            return Err(BookingError::UnknownRequest(*id));
        };

        if !request.status.is_pending() {
            return Err(BookingError::InvalidTransition(*id, request.status));
        }

        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut BookingState, action: &BookingAction) {
        match action {
            BookingAction::SeatRequested { request } => {
                state.requests.insert(request.id, request.clone());
                state.last_error = None;
            },

            BookingAction::SeatRequestApproved { id, .. } => {
                if let Some(request) = state.requests.get_mut(id) {
                    request.status = SeatRequestStatus::Approved;
                }
                state.last_error = None;
            },

            BookingAction::SeatRequestWaitlisted { id, .. } => {
                if let Some(request) = state.requests.get_mut(id) {
                    request.status = SeatRequestStatus::Waitlisted;
                }
                state.last_error = None;
            },

            BookingAction::SeatRequestDeclined { id, .. } => {
                if let Some(request) = state.requests.get_mut(id) {
                    request.status = SeatRequestStatus::Declined;
                }
                state.last_error = None;
            },

            BookingAction::BookingRejected { error } => {
                state.last_error = Some(error.clone());
            },

            // Commands are not applied to state
            BookingAction::Submit { .. }
            | BookingAction::Approve { .. }
            | BookingAction::Waitlist { .. }
            | BookingAction::Decline { .. } => {},
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            BookingAction::Submit {
                id,
                event_id,
                guest_id,
                note,
            } => {
                if let Err(error) = Self::validate_submit(state, &id, &event_id, &guest_id) {
                    Self::apply_event(state, &BookingAction::BookingRejected { error });
                    return SmallVec::new();
                }

                let event = BookingAction::SeatRequested {
                    request: SeatRequest {
                        id,
                        event_id,
                        guest_id,
                        note,
                        status: SeatRequestStatus::Pending,
                        created_at: env.clock.now(),
                    },
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            BookingAction::Approve { id } => {
                if let Err(error) = Self::validate_pending(state, &id) {
                    Self::apply_event(state, &BookingAction::BookingRejected { error });
                    return SmallVec::new();
                }

                let event = BookingAction::SeatRequestApproved {
                    id,
                    approved_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            BookingAction::Waitlist { id } => {
                if let Err(error) = Self::validate_pending(state, &id) {
                    Self::apply_event(state, &BookingAction::BookingRejected { error });
                    return SmallVec::new();
                }

                // validate_pending proved the request exists
                let Some(event_id) = state.requests.get(&id).map(|r| r.event_id) else {
                    return SmallVec::new();
                };
                let event = BookingAction::SeatRequestWaitlisted {
                    id,
                    event_id,
                    waitlisted_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            BookingAction::Decline { id } => {
                if let Err(error) = Self::validate_pending(state, &id) {
                    Self::apply_event(state, &BookingAction::BookingRejected { error });
                    return SmallVec::new();
                }

                let Some(event_id) = state.requests.get(&id).map(|r| r.event_id) else {
                    return SmallVec::new();
                };
                let event = BookingAction::SeatRequestDeclined {
                    id,
                    event_id,
                    declined_at: env.clock.now(),
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use supperclub_core::environment::SystemClock;
    use supperclub_testing::{ReducerTest, assertions};

    fn create_test_env() -> BookingEnvironment {
        BookingEnvironment::new(Arc::new(SystemClock))
    }

    fn submitted_state(id: SeatRequestId, event_id: EventId, guest_id: GuestId) -> BookingState {
        let mut state = BookingState::new();
        BookingReducer::new().reduce(
            &mut state,
            BookingAction::Submit {
                id,
                event_id,
                guest_id,
                note: None,
            },
            &create_test_env(),
        );
        state
    }

    #[test]
    fn test_submit_creates_pending_request() {
        let id = SeatRequestId::new();
        let event_id = EventId::new();
        let guest_id = GuestId::new();

        ReducerTest::new(BookingReducer::new())
            .with_env(create_test_env())
            .given_state(BookingState::new())
            .when_action(BookingAction::Submit {
                id,
                event_id,
                guest_id,
                note: Some("Vegetarian, please".to_string()),
            })
            .then_state(move |state| {
                let request = state.get(&id).unwrap();
                assert_eq!(request.status, SeatRequestStatus::Pending);
                assert_eq!(request.event_id, event_id);
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_submit_rejects_second_active_request() {
        let event_id = EventId::new();
        let guest_id = GuestId::new();
        let state = submitted_state(SeatRequestId::new(), event_id, guest_id);

        ReducerTest::new(BookingReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(BookingAction::Submit {
                id: SeatRequestId::new(),
                event_id,
                guest_id,
                note: None,
            })
            .then_state(move |state| {
                assert_eq!(state.len(), 1);
                assert_eq!(
                    state.last_error,
                    Some(BookingError::AlreadyRequested(event_id))
                );
            })
            .run();
    }

    #[test]
    fn test_declined_guest_may_request_again() {
        let id = SeatRequestId::new();
        let event_id = EventId::new();
        let guest_id = GuestId::new();
        let reducer = BookingReducer::new();
        let env = create_test_env();
        let mut state = submitted_state(id, event_id, guest_id);

        reducer.reduce(&mut state, BookingAction::Decline { id }, &env);

        // The declined request no longer blocks a fresh one
        reducer.reduce(
            &mut state,
            BookingAction::Submit {
                id: SeatRequestId::new(),
                event_id,
                guest_id,
                note: None,
            },
            &env,
        );
        assert_eq!(state.len(), 2);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_approve_pending_request() {
        let id = SeatRequestId::new();
        let state = submitted_state(id, EventId::new(), GuestId::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(BookingAction::Approve { id })
            .then_state(move |state| {
                assert_eq!(state.get(&id).unwrap().status, SeatRequestStatus::Approved);
            })
            .run();
    }

    #[test]
    fn test_decline_twice_fails_the_second_time() {
        let id = SeatRequestId::new();
        let reducer = BookingReducer::new();
        let env = create_test_env();
        let mut state = submitted_state(id, EventId::new(), GuestId::new());

        reducer.reduce(&mut state, BookingAction::Decline { id }, &env);
        assert_eq!(state.get(&id).unwrap().status, SeatRequestStatus::Declined);
        assert!(state.last_error.is_none());

        reducer.reduce(&mut state, BookingAction::Decline { id }, &env);
        assert_eq!(
            state.last_error,
            Some(BookingError::InvalidTransition(
                id,
                SeatRequestStatus::Declined
            ))
        );
    }

    #[test]
    fn test_waitlist_is_terminal() {
        let id = SeatRequestId::new();
        let reducer = BookingReducer::new();
        let env = create_test_env();
        let mut state = submitted_state(id, EventId::new(), GuestId::new());

        reducer.reduce(&mut state, BookingAction::Waitlist { id }, &env);
        assert_eq!(
            state.get(&id).unwrap().status,
            SeatRequestStatus::Waitlisted
        );

        // No promotion back to approved
        reducer.reduce(&mut state, BookingAction::Approve { id }, &env);
        assert_eq!(
            state.get(&id).unwrap().status,
            SeatRequestStatus::Waitlisted
        );
        assert_eq!(
            state.last_error,
            Some(BookingError::InvalidTransition(
                id,
                SeatRequestStatus::Waitlisted
            ))
        );
    }

    #[test]
    fn test_decision_on_unknown_request() {
        let id = SeatRequestId::new();

        ReducerTest::new(BookingReducer::new())
            .with_env(create_test_env())
            .given_state(BookingState::new())
            .when_action(BookingAction::Approve { id })
            .then_state(move |state| {
                assert_eq!(state.last_error, Some(BookingError::UnknownRequest(id)));
            })
            .run();
    }
}
