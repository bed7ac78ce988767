//! Event directory aggregate: the raw dining-event records.
//!
//! Owns the descriptive fields of an event and the `cook_id` slot. The
//! cook slot is written exclusively through `AssignCook`, issued by the
//! marketplace service after a collaboration is accepted, and assignment
//! is first-writer-wins: a later acceptance targeting the same event does
//! not steal the slot.
//!
//! Events are never deleted; cancellation flips a status flag and the
//! record (and its seat counter) remains.

use crate::types::{CookId, DiningEvent, EventId, EventStatus, HostId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use supperclub_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Rejections produced by the event directory
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryError {
    /// Event title must not be empty
    #[error("event title cannot be empty")]
    EmptyTitle,

    /// Cuisine tag must not be empty
    #[error("event cuisine cannot be empty")]
    EmptyCuisine,

    /// No event with this identifier
    #[error("event {0} not found")]
    UnknownEvent(EventId),

    /// An event with this identifier already exists
    #[error("event {0} already exists")]
    DuplicateEvent(EventId),

    /// The cook slot is already taken by a different cook
    #[error("event {event_id} already has cook {assigned} assigned")]
    CookAlreadyAssigned {
        /// Event whose slot is taken
        event_id: EventId,
        /// Cook currently holding the slot
        assigned: CookId,
    },

    /// The event has already been cancelled
    #[error("event {0} is already cancelled")]
    AlreadyCancelled(EventId),
}

// ============================================================================
// State
// ============================================================================

/// State for the event directory reducer
#[derive(Clone, Debug, Default)]
pub struct DirectoryState {
    /// All events indexed by id
    events: HashMap<EventId, DiningEvent>,
    /// Rejection recorded by the most recent dispatch, if any
    pub last_error: Option<DirectoryError>,
}

impl DirectoryState {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an event by id
    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<&DiningEvent> {
        self.events.get(id)
    }

    /// All events owned by a host
    #[must_use]
    pub fn for_host(&self, host_id: &HostId) -> Vec<&DiningEvent> {
        self.events
            .values()
            .filter(|e| e.host_id == *host_id)
            .collect()
    }

    /// Snapshot of every event record, for the read-side catalog filter
    #[must_use]
    pub fn all(&self) -> Vec<DiningEvent> {
        self.events.values().cloned().collect()
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the event directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DirectoryAction {
    // Commands
    /// A host publishes a new event
    Create {
        /// Event identifier (generated by the caller)
        id: EventId,
        /// Owning host
        host_id: HostId,
        /// Display title
        title: String,
        /// Cuisine tag
        cuisine: String,
        /// Calendar date
        date: NaiveDate,
        /// Doors-open time
        start_time: NaiveTime,
        /// End time
        end_time: NaiveTime,
        /// Venue location
        location: String,
        /// Image URLs
        images: Vec<String>,
    },

    /// Assign a cook to an event (first-writer-wins)
    AssignCook {
        /// Target event
        event_id: EventId,
        /// Cook to assign
        cook_id: CookId,
    },

    /// Cancel an event (status flag, not erasure)
    Cancel {
        /// Event to cancel
        event_id: EventId,
    },

    // Events
    /// An event record was created
    EventCreated {
        /// The full event record
        event: DiningEvent,
    },

    /// A cook was assigned to an event
    CookAssigned {
        /// Event whose slot was filled
        event_id: EventId,
        /// Assigned cook
        cook_id: CookId,
        /// When assigned
        assigned_at: DateTime<Utc>,
    },

    /// An event was cancelled
    EventCancelled {
        /// Cancelled event
        event_id: EventId,
        /// When cancelled
        cancelled_at: DateTime<Utc>,
    },

    /// A command was rejected
    DirectoryRejected {
        /// Why the command was rejected
        error: DirectoryError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the event directory
#[derive(Clone)]
pub struct DirectoryEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl DirectoryEnvironment {
    /// Creates a new `DirectoryEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the event directory
#[derive(Clone, Debug, Default)]
pub struct DirectoryReducer;

impl DirectoryReducer {
    /// Creates a new `DirectoryReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `Create` command
    fn validate_create(
        state: &DirectoryState,
        id: &EventId,
        title: &str,
        cuisine: &str,
    ) -> Result<(), DirectoryError> {
        if state.events.contains_key(id) {
            return Err(DirectoryError::DuplicateEvent(*id));
        }

        if title.trim().is_empty() {
            return Err(DirectoryError::EmptyTitle);
        }

        if cuisine.trim().is_empty() {
            return Err(DirectoryError::EmptyCuisine);
        }

        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut DirectoryState, action: &DirectoryAction) {
        match action {
            DirectoryAction::EventCreated { event } => {
                state.events.insert(event.id, event.clone());
                state.last_error = None;
            },

            DirectoryAction::CookAssigned {
                event_id, cook_id, ..
            } => {
                if let Some(event) = state.events.get_mut(event_id) {
                    event.cook_id = Some(*cook_id);
                }
                state.last_error = None;
            },

            DirectoryAction::EventCancelled { event_id, .. } => {
                if let Some(event) = state.events.get_mut(event_id) {
                    event.status = EventStatus::Cancelled;
                }
                state.last_error = None;
            },

            DirectoryAction::DirectoryRejected { error } => {
                state.last_error = Some(error.clone());
            },

            // Commands are not applied to state
            DirectoryAction::Create { .. }
            | DirectoryAction::AssignCook { .. }
            | DirectoryAction::Cancel { .. } => {},
        }
    }
}

impl Reducer for DirectoryReducer {
    type State = DirectoryState;
    type Action = DirectoryAction;
    type Environment = DirectoryEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            DirectoryAction::Create {
                id,
                host_id,
                title,
                cuisine,
                date,
                start_time,
                end_time,
                location,
                images,
            } => {
                if let Err(error) = Self::validate_create(state, &id, &title, &cuisine) {
                    Self::apply_event(state, &DirectoryAction::DirectoryRejected { error });
                    return SmallVec::new();
                }

                let event = DirectoryAction::EventCreated {
                    event: DiningEvent {
                        id,
                        title,
                        cuisine,
                        host_id,
                        cook_id: None,
                        date,
                        start_time,
                        end_time,
                        location,
                        images,
                        status: EventStatus::Upcoming,
                        created_at: env.clock.now(),
                    },
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            DirectoryAction::AssignCook { event_id, cook_id } => {
                let Some(existing) = state.events.get(&event_id) else {
                    Self::apply_event(
                        state,
                        &DirectoryAction::DirectoryRejected {
                            error: DirectoryError::UnknownEvent(event_id),
                        },
                    );
                    return SmallVec::new();
                };

                // First-writer-wins: the slot is only written while empty.
                // Re-assigning the same cook is an idempotent no-op.
                match existing.cook_id {
                    Some(assigned) if assigned != cook_id => {
                        Self::apply_event(
                            state,
                            &DirectoryAction::DirectoryRejected {
                                error: DirectoryError::CookAlreadyAssigned { event_id, assigned },
                            },
                        );
                        return SmallVec::new();
                    },
                    Some(_) => {
                        state.last_error = None;
                        return SmallVec::new();
                    },
                    None => {},
                }

                let event = DirectoryAction::CookAssigned {
                    event_id,
                    cook_id,
                    assigned_at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                SmallVec::new()
            },

            DirectoryAction::Cancel { event_id } => {
                let Some(existing) = state.events.get(&event_id) else {
                    Self::apply_event(
                        state,
                        &DirectoryAction::DirectoryRejected {
                            error: DirectoryError::UnknownEvent(event_id),
                        },
                    );
                    return SmallVec::new();
                };

                if existing.is_cancelled() {
                    Self::apply_event(
                        state,
                        &DirectoryAction::DirectoryRejected {
                            error: DirectoryError::AlreadyCancelled(event_id),
                        },
                    );
                    return SmallVec::new();
                }

                let event = DirectoryAction::EventCancelled {
                    event_id,
                    cancelled_at: env.clock.now(),
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

    fn create_test_env() -> DirectoryEnvironment {
        DirectoryEnvironment::new(Arc::new(SystemClock))
    }

    fn create_action(id: EventId, host_id: HostId) -> DirectoryAction {
        DirectoryAction::Create {
            id,
            host_id,
            title: "Nonna's table".to_string(),
            cuisine: "Italian".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            location: "Brooklyn loft".to_string(),
            images: vec![],
        }
    }

    fn created_state(id: EventId, host_id: HostId) -> DirectoryState {
        let mut state = DirectoryState::new();
        DirectoryReducer::new().reduce(&mut state, create_action(id, host_id), &create_test_env());
        state
    }

    #[test]
    fn test_create_event() {
        let id = EventId::new();
        let host_id = HostId::new();

        ReducerTest::new(DirectoryReducer::new())
            .with_env(create_test_env())
            .given_state(DirectoryState::new())
            .when_action(create_action(id, host_id))
            .then_state(move |state| {
                let event = state.get(&id).unwrap();
                assert_eq!(event.host_id, host_id);
                assert_eq!(event.status, EventStatus::Upcoming);
                assert!(event.cook_id.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_create_rejects_empty_title() {
        ReducerTest::new(DirectoryReducer::new())
            .with_env(create_test_env())
            .given_state(DirectoryState::new())
            .when_action(DirectoryAction::Create {
                id: EventId::new(),
                host_id: HostId::new(),
                title: "  ".to_string(),
                cuisine: "Japanese".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
                start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                location: "Shibuya".to_string(),
                images: vec![],
            })
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.last_error, Some(DirectoryError::EmptyTitle));
            })
            .run();
    }

    #[test]
    fn test_assign_cook_first_writer_wins() {
        let id = EventId::new();
        let first = CookId::new();
        let second = CookId::new();
        let reducer = DirectoryReducer::new();
        let env = create_test_env();
        let mut state = created_state(id, HostId::new());

        reducer.reduce(
            &mut state,
            DirectoryAction::AssignCook {
                event_id: id,
                cook_id: first,
            },
            &env,
        );
        assert_eq!(state.get(&id).unwrap().cook_id, Some(first));

        // A later assignment does not steal the slot
        reducer.reduce(
            &mut state,
            DirectoryAction::AssignCook {
                event_id: id,
                cook_id: second,
            },
            &env,
        );
        assert_eq!(state.get(&id).unwrap().cook_id, Some(first));
        assert_eq!(
            state.last_error,
            Some(DirectoryError::CookAlreadyAssigned {
                event_id: id,
                assigned: first
            })
        );

        // Re-assigning the same cook is an idempotent no-op
        reducer.reduce(
            &mut state,
            DirectoryAction::AssignCook {
                event_id: id,
                cook_id: first,
            },
            &env,
        );
        assert_eq!(state.get(&id).unwrap().cook_id, Some(first));
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_cancel_flips_status_once() {
        let id = EventId::new();
        let reducer = DirectoryReducer::new();
        let env = create_test_env();
        let mut state = created_state(id, HostId::new());

        reducer.reduce(&mut state, DirectoryAction::Cancel { event_id: id }, &env);
        assert!(state.get(&id).unwrap().is_cancelled());

        reducer.reduce(&mut state, DirectoryAction::Cancel { event_id: id }, &env);
        assert_eq!(state.last_error, Some(DirectoryError::AlreadyCancelled(id)));
        // Record is flagged, never erased
        assert!(state.get(&id).is_some());
    }
}
