//! Collaboration aggregate: the cook-to-host proposal lifecycle.
//!
//! State machine per request: `pending -> accepted` or `pending ->
//! declined`. Terminal states have no outgoing transitions - a second
//! decision on the same request is rejected with `InvalidTransition`, so
//! a proposal is never re-opened.
//!
//! Accepting a proposal does not touch the event record here; the
//! marketplace service assigns the cook through the directory aggregate
//! (first-writer-wins) once the acceptance has been committed.

use crate::types::{
    CollaborationId, CollaborationRequest, CollaborationStatus, CookId, EventId, HostId,
    MAX_PROPOSED_DISHES,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use supperclub_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Rejections produced by the collaboration aggregate
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollaborationError {
    /// Proposal message must not be empty
    #[error("collaboration message cannot be empty")]
    EmptyMessage,

    /// Too many dishes attached to the proposal
    #[error("at most {MAX_PROPOSED_DISHES} dishes may be proposed (got {0})")]
    TooManyDishes(usize),

    /// No request with this identifier
    #[error("collaboration request {0} not found")]
    UnknownRequest(CollaborationId),

    /// The request has already been decided
    #[error("collaboration request {0} is already {1}")]
    InvalidTransition(CollaborationId, CollaborationStatus),

    /// A request with this identifier already exists
    #[error("collaboration request {0} already exists")]
    DuplicateRequest(CollaborationId),
}

// ============================================================================
// State
// ============================================================================

/// State for the collaboration reducer
#[derive(Clone, Debug, Default)]
pub struct CollaborationState {
    /// All requests indexed by id
    requests: HashMap<CollaborationId, CollaborationRequest>,
    /// Rejection recorded by the most recent dispatch, if any
    pub last_error: Option<CollaborationError>,
}

impl CollaborationState {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a request by id
    #[must_use]
    pub fn get(&self, id: &CollaborationId) -> Option<&CollaborationRequest> {
        self.requests.get(id)
    }

    /// All requests addressed to a host
    #[must_use]
    pub fn for_host(&self, host_id: &HostId) -> Vec<&CollaborationRequest> {
        self.requests
            .values()
            .filter(|r| r.to_host_id == *host_id)
            .collect()
    }

    /// All requests proposed by a cook
    #[must_use]
    pub fn from_cook(&self, cook_id: &CookId) -> Vec<&CollaborationRequest> {
        self.requests
            .values()
            .filter(|r| r.from_cook_id == *cook_id)
            .collect()
    }

    /// Snapshot of every request, for the read-side catalog filter
    #[must_use]
    pub fn all(&self) -> Vec<CollaborationRequest> {
        self.requests.values().cloned().collect()
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

/// Actions for the collaboration aggregate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CollaborationAction {
    // Commands
    /// A cook proposes a collaboration to a host
    Propose {
        /// Request identifier (generated by the caller)
        id: CollaborationId,
        /// Proposing cook
        from_cook_id: CookId,
        /// Target host
        to_host_id: HostId,
        /// Target event, when the proposal is for a specific dinner
        event_id: Option<EventId>,
        /// Message to the host
        message: String,
        /// Dishes the cook proposes to serve
        proposed_dishes: Vec<String>,
    },

    /// The target host accepts the proposal
    Accept {
        /// Request to accept
        id: CollaborationId,
    },

    /// The target host declines the proposal
    Decline {
        /// Request to decline
        id: CollaborationId,
    },

    // Events
    /// A proposal was recorded
    CollaborationProposed {
        /// The full request record
        request: CollaborationRequest,
    },

    /// A proposal was accepted
    CollaborationAccepted {
        /// Request id
        id: CollaborationId,
        /// When accepted
        accepted_at: DateTime<Utc>,
    },

    /// A proposal was declined
    CollaborationDeclined {
        /// Request id
        id: CollaborationId,
        /// When declined
        declined_at: DateTime<Utc>,
    },

    /// A command was rejected
    CollaborationRejected {
        /// Why the command was rejected
        error: CollaborationError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the collaboration aggregate
#[derive(Clone)]
pub struct CollaborationEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl CollaborationEnvironment {
    /// Creates a new `CollaborationEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the collaboration aggregate
#[derive(Clone, Debug, Default)]
pub struct CollaborationReducer;

impl CollaborationReducer {
    /// Creates a new `CollaborationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Propose` command
    fn validate_propose(
        state: &CollaborationState,
        id: &CollaborationId,
        message: &str,
        proposed_dishes: &[String],
    ) -> Result<(), CollaborationError> {
        if state.requests.contains_key(id) {
            return Err(CollaborationError::DuplicateRequest(*id));
        }

        if message.trim().is_empty() {
            return Err(CollaborationError::EmptyMessage);
        }

        if proposed_dishes.len() > MAX_PROPOSED_DISHES {
            return Err(CollaborationError::TooManyDishes(proposed_dishes.len()));
        }

        Ok(())
    }

    /// Validates that a request exists and is still pending
    fn validate_pending(
        state: &CollaborationState,
        id: &CollaborationId,
    ) -> Result<(), CollaborationError> {
        let Some(request) = state.requests.get(id) else {
            return Err(CollaborationError::UnknownRequest(*id));
        };

        if !request.status.is_pending() {
            return Err(CollaborationError::InvalidTransition(*id, request.status));
        }

        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut CollaborationState, action: &CollaborationAction) {
        match action {
            CollaborationAction::CollaborationProposed { request } => {
                state.requests.insert(request.id, request.clone());
                state.last_error = None;
            },

            CollaborationAction::CollaborationAccepted { id, .. } => {
                if let Some(request) = state.requests.get_mut(id) {
                    request.status = CollaborationStatus::Accepted;
                }
                state.last_error = None;
            },

            CollaborationAction::CollaborationDeclined { id, .. } => {
                if let Some(request) = state.requests.get_mut(id) {
                    request.status = CollaborationStatus::Declined;
                }
                state.last_error = None;
            },

            CollaborationAction::CollaborationRejected { error } => {
                state.last_error = Some(error.clone());
            },

            // Commands are not applied to state
            CollaborationAction::Propose { .. }
            | CollaborationAction::Accept { .. }
            | CollaborationAction::Decline { .. } => {},
        }
    }
}

impl Reducer for CollaborationReducer {
    type State = CollaborationState;
    type Action = CollaborationAction;
    type Environment = CollaborationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CollaborationAction::Propose {
                id,
                from_cook_id,
                to_host_id,
                event_id,
                message,
                proposed_dishes,
            } => {
                if let Err(error) = Self::validate_propose(state, &id, &message, &proposed_dishes) {
                    Self::apply_event(state, &CollaborationAction::CollaborationRejected { error });
                    return SmallVec::new();
                }

                let event = CollaborationAction::CollaborationProposed {
                    request: CollaborationRequest {
                        id,
                        from_cook_id,
                        to_host_id,
                        event_id,
                        message,
                        proposed_dishes,
                        status: CollaborationStatus::Pending,
                        created_at: env.clock.now(),
                    },
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            CollaborationAction::Accept { id } => {
                // Status re-checked under the store write lock: of two
                // concurrent decisions, exactly one wins and the loser
                // observes InvalidTransition.
                if let Err(error) = Self::validate_pending(state, &id) {
                    Self::apply_event(state, &CollaborationAction::CollaborationRejected { error });
                    return SmallVec::new();
                }

                let event = CollaborationAction::CollaborationAccepted {
                    id,
                    accepted_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            CollaborationAction::Decline { id } => {
                if let Err(error) = Self::validate_pending(state, &id) {
                    Self::apply_event(state, &CollaborationAction::CollaborationRejected { error });
                    return SmallVec::new();
                }

                let event = CollaborationAction::CollaborationDeclined {
                    id,
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

    fn create_test_env() -> CollaborationEnvironment {
        CollaborationEnvironment::new(Arc::new(SystemClock))
    }

    fn propose(
        state: &mut CollaborationState,
        id: CollaborationId,
        event_id: Option<EventId>,
    ) -> (CookId, HostId) {
        let from_cook_id = CookId::new();
        let to_host_id = HostId::new();
        CollaborationReducer::new().reduce(
            state,
            CollaborationAction::Propose {
                id,
                from_cook_id,
                to_host_id,
                event_id,
                message: "Would love to cook a tasting menu at your place".to_string(),
                proposed_dishes: vec!["Cacio e pepe".to_string()],
            },
            &create_test_env(),
        );
        (from_cook_id, to_host_id)
    }

    #[test]
    fn test_propose_success() {
        let id = CollaborationId::new();
        let from_cook_id = CookId::new();
        let to_host_id = HostId::new();

        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(CollaborationState::new())
            .when_action(CollaborationAction::Propose {
                id,
                from_cook_id,
                to_host_id,
                event_id: None,
                message: "Let's host a dinner together".to_string(),
                proposed_dishes: vec!["Ramen".to_string(), "Gyoza".to_string()],
            })
            .then_state(move |state| {
                let request = state.get(&id).unwrap();
                assert_eq!(request.status, CollaborationStatus::Pending);
                assert_eq!(request.from_cook_id, from_cook_id);
                assert!(request.event_id.is_none());
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_propose_rejects_empty_message() {
        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(CollaborationState::new())
            .when_action(CollaborationAction::Propose {
                id: CollaborationId::new(),
                from_cook_id: CookId::new(),
                to_host_id: HostId::new(),
                event_id: None,
                message: "   ".to_string(),
                proposed_dishes: vec![],
            })
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.last_error, Some(CollaborationError::EmptyMessage));
            })
            .run();
    }

    #[test]
    fn test_propose_rejects_too_many_dishes() {
        let dishes: Vec<String> = (0..6).map(|i| format!("Dish {i}")).collect();

        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(CollaborationState::new())
            .when_action(CollaborationAction::Propose {
                id: CollaborationId::new(),
                from_cook_id: CookId::new(),
                to_host_id: HostId::new(),
                event_id: None,
                message: "Six-course menu".to_string(),
                proposed_dishes: dishes,
            })
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.last_error, Some(CollaborationError::TooManyDishes(6)));
            })
            .run();
    }

    #[test]
    fn test_accept_pending_request() {
        let id = CollaborationId::new();
        let mut state = CollaborationState::new();
        propose(&mut state, id, Some(EventId::new()));

        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(CollaborationAction::Accept { id })
            .then_state(move |state| {
                assert_eq!(
                    state.get(&id).unwrap().status,
                    CollaborationStatus::Accepted
                );
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn test_decline_pending_request() {
        let id = CollaborationId::new();
        let mut state = CollaborationState::new();
        propose(&mut state, id, None);

        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(CollaborationAction::Decline { id })
            .then_state(move |state| {
                assert_eq!(
                    state.get(&id).unwrap().status,
                    CollaborationStatus::Declined
                );
            })
            .run();
    }

    #[test]
    fn test_terminal_status_is_monotonic() {
        let id = CollaborationId::new();
        let reducer = CollaborationReducer::new();
        let env = create_test_env();
        let mut state = CollaborationState::new();
        propose(&mut state, id, None);

        reducer.reduce(&mut state, CollaborationAction::Decline { id }, &env);
        assert_eq!(state.get(&id).unwrap().status, CollaborationStatus::Declined);

        // Neither a second decline nor a late accept may re-open it
        reducer.reduce(&mut state, CollaborationAction::Decline { id }, &env);
        assert_eq!(
            state.last_error,
            Some(CollaborationError::InvalidTransition(
                id,
                CollaborationStatus::Declined
            ))
        );

        reducer.reduce(&mut state, CollaborationAction::Accept { id }, &env);
        assert_eq!(state.get(&id).unwrap().status, CollaborationStatus::Declined);
        assert_eq!(
            state.last_error,
            Some(CollaborationError::InvalidTransition(
                id,
                CollaborationStatus::Declined
            ))
        );
    }

    #[test]
    fn test_accept_unknown_request() {
        let id = CollaborationId::new();

        ReducerTest::new(CollaborationReducer::new())
            .with_env(create_test_env())
            .given_state(CollaborationState::new())
            .when_action(CollaborationAction::Accept { id })
            .then_state(move |state| {
                assert_eq!(state.last_error, Some(CollaborationError::UnknownRequest(id)));
            })
            .run();
    }

    #[test]
    fn test_cook_may_hold_multiple_pending_requests() {
        let mut state = CollaborationState::new();
        let reducer = CollaborationReducer::new();
        let env = create_test_env();
        let cook = CookId::new();

        for _ in 0..3 {
            reducer.reduce(
                &mut state,
                CollaborationAction::Propose {
                    id: CollaborationId::new(),
                    from_cook_id: cook,
                    to_host_id: HostId::new(),
                    event_id: None,
                    message: "Pop-up dinner proposal".to_string(),
                    proposed_dishes: vec![],
                },
                &env,
            );
        }

        assert_eq!(state.from_cook(&cook).len(), 3);
        assert!(
            state
                .from_cook(&cook)
                .iter()
                .all(|r| r.status.is_pending())
        );
    }
}
