//! Domain types for the supper-club marketplace.
//!
//! Value objects and entities shared across aggregates: identifiers,
//! the dining-event record, collaboration requests, seat requests, and
//! the seat counter.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum number of dishes a cook may attach to a collaboration proposal
pub const MAX_PROPOSED_DISHES: usize = 5;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a dining event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a host (venue owner)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(Uuid);

impl HostId {
    /// Creates a new random `HostId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `HostId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a cook
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CookId(Uuid);

impl CookId {
    /// Creates a new random `CookId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CookId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of a guest, supplied by the identity provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestId(Uuid);

impl GuestId {
    /// Creates a new random `GuestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `GuestId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a collaboration request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollaborationId(Uuid);

impl CollaborationId {
    /// Creates a new random `CollaborationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CollaborationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CollaborationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CollaborationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a seat request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRequestId(Uuid);

impl SeatRequestId {
    /// Creates a new random `SeatRequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SeatRequestId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SeatRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SeatRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Caller identity
// ============================================================================

/// Role of the current caller, supplied by the identity provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books seats at published events
    Guest,
    /// Owns a venue and publishes events
    Host,
    /// Proposes culinary collaborations with hosts
    Cook,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Host => write!(f, "host"),
            Self::Cook => write!(f, "cook"),
        }
    }
}

// ============================================================================
// Dining events
// ============================================================================

/// Lifecycle status of a dining event
///
/// Cancellation is a flag, not erasure: cancelled events keep their record
/// and seat counter but drop out of the guest catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Live or scheduled
    Upcoming,
    /// Cancelled by the host
    Cancelled,
}

/// A dining event published by a host
///
/// Descriptive record only - the seat counter is owned by the seat ledger.
/// `cook_id` is set exclusively through an accepted collaboration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningEvent {
    /// Event identifier
    pub id: EventId,
    /// Display title
    pub title: String,
    /// Cuisine tag used for interest matching (e.g. "Italian")
    pub cuisine: String,
    /// Owning host
    pub host_id: HostId,
    /// Assigned cook, if a collaboration has been accepted
    pub cook_id: Option<CookId>,
    /// Calendar date of the dinner
    pub date: NaiveDate,
    /// Doors-open time
    pub start_time: NaiveTime,
    /// End time
    pub end_time: NaiveTime,
    /// Venue location
    pub location: String,
    /// Image URLs
    pub images: Vec<String>,
    /// Lifecycle status
    pub status: EventStatus,
    /// When the host created the event
    pub created_at: DateTime<Utc>,
}

impl DiningEvent {
    /// Whether the event has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

// ============================================================================
// Seat counter
// ============================================================================

/// Remaining-capacity counter for one event
///
/// The seat ledger is the only writer. `reserve` is a conditional
/// decrement; `release` increments clamped at `seats_total`, so the
/// invariant `0 <= seats_left <= seats_total` holds after any sequence of
/// operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounter {
    /// Total capacity, fixed at open time
    pub seats_total: u32,
    /// Seats still available
    pub seats_left: u32,
}

impl SeatCounter {
    /// Open a counter with every seat available
    #[must_use]
    pub const fn new(seats_total: u32) -> Self {
        Self {
            seats_total,
            seats_left: seats_total,
        }
    }

    /// Conditionally take one seat; returns false when sold out
    pub const fn reserve(&mut self) -> bool {
        if self.seats_left == 0 {
            return false;
        }
        self.seats_left -= 1;
        true
    }

    /// Return one seat, clamped at total capacity
    pub const fn release(&mut self) {
        if self.seats_left < self.seats_total {
            self.seats_left += 1;
        }
    }

    /// Whether no seats remain
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.seats_left == 0
    }
}

// ============================================================================
// Collaboration requests
// ============================================================================

/// Status of a cook-to-host collaboration proposal
///
/// Monotonic: `Pending` may move to `Accepted` or `Declined`; the terminal
/// states have no outgoing transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationStatus {
    /// Awaiting the host's decision
    Pending,
    /// Host accepted; the cook is assigned to the target event
    Accepted,
    /// Host declined
    Declined,
}

impl CollaborationStatus {
    /// Whether the request is still open for a decision
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

/// A cook's proposal to collaborate with a host
///
/// May precede event creation, in which case `event_id` is `None` and an
/// acceptance assigns no cook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationRequest {
    /// Request identifier
    pub id: CollaborationId,
    /// Proposing cook
    pub from_cook_id: CookId,
    /// Target host
    pub to_host_id: HostId,
    /// Target event, when the proposal is for a specific dinner
    pub event_id: Option<EventId>,
    /// Message from the cook to the host
    pub message: String,
    /// Dishes the cook proposes to serve (at most [`MAX_PROPOSED_DISHES`])
    pub proposed_dishes: Vec<String>,
    /// Current status
    pub status: CollaborationStatus,
    /// When the cook proposed
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Seat requests
// ============================================================================

/// Status of a guest's seat request
///
/// All transitions leave `Pending` exactly once; `Approved`, `Waitlisted`,
/// and `Declined` are terminal. A waitlisted guest is not re-promoted
/// automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatRequestStatus {
    /// Awaiting the host's decision; a seat is held
    Pending,
    /// Host approved; the held seat is confirmed
    Approved,
    /// Host deferred; the held seat was returned to availability
    Waitlisted,
    /// Host declined; the held seat was returned to availability
    Declined,
}

impl SeatRequestStatus {
    /// Whether the request is still open for a decision
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// Whether the request currently holds a seat
    #[must_use]
    pub fn holds_seat(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for SeatRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Waitlisted => write!(f, "waitlisted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

/// A guest's request for one seat at a dining event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRequest {
    /// Request identifier
    pub id: SeatRequestId,
    /// Target event
    pub event_id: EventId,
    /// Requesting guest
    pub guest_id: GuestId,
    /// Optional note to the host (dietary restrictions etc.)
    pub note: Option<String>,
    /// Current status
    pub status: SeatRequestStatus,
    /// When the guest requested
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_counter_reserve_stops_at_zero() {
        let mut counter = SeatCounter::new(2);
        assert!(counter.reserve());
        assert!(counter.reserve());
        assert!(!counter.reserve());
        assert_eq!(counter.seats_left, 0);
    }

    #[test]
    fn seat_counter_release_clamps_at_total() {
        let mut counter = SeatCounter::new(2);
        counter.release();
        assert_eq!(counter.seats_left, 2);

        assert!(counter.reserve());
        counter.release();
        assert_eq!(counter.seats_left, 2);
    }

    #[test]
    fn seat_request_status_holds_seat() {
        assert!(SeatRequestStatus::Pending.holds_seat());
        assert!(SeatRequestStatus::Approved.holds_seat());
        assert!(!SeatRequestStatus::Waitlisted.holds_seat());
        assert!(!SeatRequestStatus::Declined.holds_seat());
    }
}
