//! The marketplace service - the only layer that composes aggregates.
//!
//! Guest- and host-facing operations run here as short-lived units of
//! work. Each aggregate store serializes its own dispatches; sequences
//! that span stores (reserve a seat, then record the request) are
//! compensated rather than transactional: any downstream failure releases
//! the seat that was held, so no partial application survives. Every
//! check re-evaluates current state, which keeps all operations safe to
//! retry.

use crate::aggregates::booking::BookingEnvironment;
use crate::aggregates::collaboration::CollaborationEnvironment;
use crate::aggregates::directory::DirectoryEnvironment;
use crate::aggregates::inventory::LedgerEnvironment;
use crate::aggregates::{
    BookingAction, BookingError, BookingReducer, BookingState, CollaborationAction,
    CollaborationError, CollaborationReducer, CollaborationState, DirectoryAction, DirectoryError,
    DirectoryReducer, DirectoryState, InventoryError, LedgerAction, LedgerReducer, LedgerState,
};
use crate::catalog;
use crate::media::{PhotoSearch, PhotoSearchResponse};
use crate::recommendations::{
    self, CandidateEvent, RankingService, RecommendationsResponse,
};
use crate::types::{
    CollaborationId, CollaborationRequest, CookId, DiningEvent, EventId, GuestId, HostId,
    SeatCounter, SeatRequest, SeatRequestId,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use supperclub_core::environment::{Clock, IdGenerator};
use supperclub_core::store::Store;
use thiserror::Error;

type DirectoryStore = Store<DirectoryState, DirectoryAction, DirectoryEnvironment, DirectoryReducer>;
type LedgerStore = Store<LedgerState, LedgerAction, LedgerEnvironment, LedgerReducer>;
type CollaborationStore =
    Store<CollaborationState, CollaborationAction, CollaborationEnvironment, CollaborationReducer>;
type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

// ============================================================================
// Errors
// ============================================================================

/// User-facing failures of marketplace operations
///
/// The service is the only layer that translates aggregate rejections
/// into caller responses; handlers map these onto HTTP statuses.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Seat ledger rejection (sold out, unknown counter)
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Collaboration lifecycle rejection
    #[error(transparent)]
    Collaboration(#[from] CollaborationError),

    /// Event directory rejection
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Seat-request lifecycle rejection
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// The target event has been cancelled
    #[error("event {0} is cancelled")]
    EventCancelled(EventId),

    /// The caller does not own the resource it is acting on
    #[error("caller is not allowed to act on this resource")]
    Forbidden,
}

// ============================================================================
// Request payloads
// ============================================================================

/// Fields a host supplies when publishing an event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewEvent {
    /// Display title
    pub title: String,
    /// Cuisine tag
    pub cuisine: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Doors-open time
    pub start_time: NaiveTime,
    /// End time
    pub end_time: NaiveTime,
    /// Venue location
    pub location: String,
    /// Image URLs
    pub images: Vec<String>,
    /// Total seats offered
    pub seats_total: u32,
}

/// Fields a cook supplies when proposing a collaboration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCollaboration {
    /// Target host
    pub to_host_id: HostId,
    /// Target event, when the proposal is for a specific dinner
    pub event_id: Option<EventId>,
    /// Message to the host
    pub message: String,
    /// Dishes the cook proposes to serve
    pub proposed_dishes: Vec<String>,
}

/// A guest-visible event joined with its seat counter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// The event record
    #[serde(flatten)]
    pub event: DiningEvent,
    /// Total seats offered
    pub seats_total: u32,
    /// Seats still available
    pub seats_left: u32,
}

// ============================================================================
// Service
// ============================================================================

/// Composes the aggregate stores for guest- and host-facing operations
pub struct MarketplaceService {
    directory: DirectoryStore,
    ledger: LedgerStore,
    collaborations: CollaborationStore,
    bookings: BookingStore,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    ranking: Option<Arc<dyn RankingService>>,
    photos: Option<Arc<dyn PhotoSearch>>,
}

impl MarketplaceService {
    /// Create a service with fresh, empty aggregate stores
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            directory: Store::new(
                DirectoryState::new(),
                DirectoryReducer::new(),
                DirectoryEnvironment::new(clock.clone()),
            ),
            ledger: Store::new(
                LedgerState::new(),
                LedgerReducer::new(),
                LedgerEnvironment::new(clock.clone()),
            ),
            collaborations: Store::new(
                CollaborationState::new(),
                CollaborationReducer::new(),
                CollaborationEnvironment::new(clock.clone()),
            ),
            bookings: Store::new(
                BookingState::new(),
                BookingReducer::new(),
                BookingEnvironment::new(clock.clone()),
            ),
            clock,
            ids,
            ranking: None,
            photos: None,
        }
    }

    /// Attach an external ranking service
    #[must_use]
    pub fn with_ranking(mut self, ranking: Arc<dyn RankingService>) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Attach a photo search provider
    #[must_use]
    pub fn with_photos(mut self, photos: Arc<dyn PhotoSearch>) -> Self {
        self.photos = Some(photos);
        self
    }

    // ========================================================================
    // Host: events
    // ========================================================================

    /// Publish a new event with every seat available
    ///
    /// # Errors
    ///
    /// Returns a validation rejection before any mutation (empty title or
    /// cuisine, zero capacity).
    pub async fn create_event(
        &self,
        host_id: HostId,
        new_event: NewEvent,
    ) -> Result<CatalogEntry, ServiceError> {
        // Reject before any record exists; the directory write and the
        // ledger open below cannot fail afterwards.
        if new_event.seats_total == 0 {
            return Err(InventoryError::ZeroCapacity.into());
        }

        let event_id = EventId::from_uuid(self.ids.next_id());
        let seats_total = new_event.seats_total;

        let (error, created) = self
            .directory
            .send_and_read(
                DirectoryAction::Create {
                    id: event_id,
                    host_id,
                    title: new_event.title,
                    cuisine: new_event.cuisine,
                    date: new_event.date,
                    start_time: new_event.start_time,
                    end_time: new_event.end_time,
                    location: new_event.location,
                    images: new_event.images,
                },
                |s| (s.last_error.clone(), s.get(&event_id).cloned()),
            )
            .await;

        if let Some(error) = error {
            return Err(error.into());
        }
        let Some(event) = created else {
            return Err(DirectoryError::UnknownEvent(event_id).into());
        };

        let error = self
            .ledger
            .send_and_read(
                LedgerAction::Open {
                    event_id,
                    seats_total,
                },
                |s| s.last_error.clone(),
            )
            .await;
        if let Some(error) = error {
            return Err(error.into());
        }

        tracing::info!(%event_id, %host_id, seats_total, "event published");

        Ok(CatalogEntry {
            event,
            seats_total,
            seats_left: seats_total,
        })
    }

    /// Cancel an event (status flag; record and counter remain)
    ///
    /// # Errors
    ///
    /// Fails when the event is unknown, already cancelled, or owned by a
    /// different host.
    pub async fn cancel_event(
        &self,
        host_id: HostId,
        event_id: EventId,
    ) -> Result<(), ServiceError> {
        self.check_event_owner(event_id, host_id).await?;

        let error = self
            .directory
            .send_and_read(DirectoryAction::Cancel { event_id }, |s| {
                s.last_error.clone()
            })
            .await;
        match error {
            Some(error) => Err(error.into()),
            None => {
                tracing::info!(%event_id, "event cancelled");
                Ok(())
            },
        }
    }

    // ========================================================================
    // Cook + host: collaborations
    // ========================================================================

    /// A cook proposes a collaboration to a host
    ///
    /// # Errors
    ///
    /// Rejects an empty message, more than the allowed number of proposed
    /// dishes, or an unknown target event.
    pub async fn propose_collaboration(
        &self,
        cook_id: CookId,
        proposal: NewCollaboration,
    ) -> Result<CollaborationRequest, ServiceError> {
        if let Some(event_id) = proposal.event_id {
            if self.directory.state(|s| s.get(&event_id).cloned()).await.is_none() {
                return Err(DirectoryError::UnknownEvent(event_id).into());
            }
        }

        let id = CollaborationId::from_uuid(self.ids.next_id());
        let (error, created) = self
            .collaborations
            .send_and_read(
                CollaborationAction::Propose {
                    id,
                    from_cook_id: cook_id,
                    to_host_id: proposal.to_host_id,
                    event_id: proposal.event_id,
                    message: proposal.message,
                    proposed_dishes: proposal.proposed_dishes,
                },
                |s| (s.last_error.clone(), s.get(&id).cloned()),
            )
            .await;

        if let Some(error) = error {
            return Err(error.into());
        }
        created.ok_or_else(|| ServiceError::from(CollaborationError::UnknownRequest(id)))
    }

    /// The target host accepts a proposal
    ///
    /// On success the proposing cook is assigned to the target event,
    /// first-writer-wins: when a different cook already holds the slot the
    /// acceptance stands but the slot is left untouched.
    ///
    /// # Errors
    ///
    /// Fails when the request is unknown, already decided, or addressed to
    /// a different host.
    pub async fn accept_collaboration(
        &self,
        host_id: HostId,
        id: CollaborationId,
    ) -> Result<CollaborationRequest, ServiceError> {
        self.check_collaboration_target(id, host_id).await?;

        let (error, accepted) = self
            .collaborations
            .send_and_read(CollaborationAction::Accept { id }, |s| {
                (s.last_error.clone(), s.get(&id).cloned())
            })
            .await;

        if let Some(error) = error {
            return Err(error.into());
        }
        let Some(request) = accepted else {
            return Err(CollaborationError::UnknownRequest(id).into());
        };

        if let Some(event_id) = request.event_id {
            let error = self
                .directory
                .send_and_read(
                    DirectoryAction::AssignCook {
                        event_id,
                        cook_id: request.from_cook_id,
                    },
                    |s| s.last_error.clone(),
                )
                .await;
            if let Some(error) = error {
                // The acceptance stands; the slot keeps its first writer
                tracing::warn!(%id, %event_id, %error, "cook assignment skipped");
            }
        }

        tracing::info!(%id, %host_id, "collaboration accepted");
        Ok(request)
    }

    /// The target host declines a proposal
    ///
    /// # Errors
    ///
    /// Fails when the request is unknown, already decided, or addressed to
    /// a different host.
    pub async fn decline_collaboration(
        &self,
        host_id: HostId,
        id: CollaborationId,
    ) -> Result<CollaborationRequest, ServiceError> {
        self.check_collaboration_target(id, host_id).await?;

        let (error, declined) = self
            .collaborations
            .send_and_read(CollaborationAction::Decline { id }, |s| {
                (s.last_error.clone(), s.get(&id).cloned())
            })
            .await;

        if let Some(error) = error {
            return Err(error.into());
        }
        declined.ok_or_else(|| ServiceError::from(CollaborationError::UnknownRequest(id)))
    }

    // ========================================================================
    // Guest: seat requests
    // ========================================================================

    /// A guest requests one seat at an event
    ///
    /// The seat is reserved first so a sold-out event rejects immediately
    /// without creating a request record. If recording the request fails
    /// (e.g. the guest already holds an active request), the held seat is
    /// released before the error is returned.
    ///
    /// # Errors
    ///
    /// Fails with the ledger's `SoldOut`, the booking aggregate's
    /// `AlreadyRequested`, or an unknown/cancelled event.
    pub async fn request_seat(
        &self,
        guest_id: GuestId,
        event_id: EventId,
        note: Option<String>,
    ) -> Result<SeatRequest, ServiceError> {
        let Some(event) = self.directory.state(|s| s.get(&event_id).cloned()).await else {
            return Err(DirectoryError::UnknownEvent(event_id).into());
        };
        if event.is_cancelled() {
            return Err(ServiceError::EventCancelled(event_id));
        }

        // Hold the seat before recording anything: losers of the last-seat
        // race get SoldOut here and leave no trace.
        let error = self
            .ledger
            .send_and_read(LedgerAction::Reserve { event_id }, |s| {
                s.last_error.clone()
            })
            .await;
        if let Some(error) = error {
            return Err(error.into());
        }

        let id = SeatRequestId::from_uuid(self.ids.next_id());
        let (error, created) = self
            .bookings
            .send_and_read(
                BookingAction::Submit {
                    id,
                    event_id,
                    guest_id,
                    note,
                },
                |s| (s.last_error.clone(), s.get(&id).cloned()),
            )
            .await;

        match (error, created) {
            (None, Some(request)) => {
                tracing::info!(%id, %event_id, %guest_id, "seat requested");
                Ok(request)
            },
            (error, _) => {
                // Compensation: the record was not created, so the held
                // seat must go back.
                self.ledger.send(LedgerAction::Release { event_id }).await;
                Err(error
                    .map_or_else(
                        || ServiceError::from(BookingError::UnknownRequest(id)),
                        ServiceError::from,
                    ))
            },
        }
    }

    /// The host approves a pending request; the held seat is confirmed
    ///
    /// # Errors
    ///
    /// Fails when the request is unknown, already decided, or belongs to
    /// an event the caller does not host.
    pub async fn approve_seat(
        &self,
        host_id: HostId,
        id: SeatRequestId,
    ) -> Result<SeatRequest, ServiceError> {
        self.check_seat_request_owner(id, host_id).await?;

        let (error, updated) = self
            .bookings
            .send_and_read(BookingAction::Approve { id }, |s| {
                (s.last_error.clone(), s.get(&id).cloned())
            })
            .await;

        if let Some(error) = error {
            return Err(error.into());
        }
        // No ledger mutation: the seat was reserved at request time
        updated.ok_or_else(|| ServiceError::from(BookingError::UnknownRequest(id)))
    }

    /// The host waitlists a pending request; the held seat is released
    ///
    /// # Errors
    ///
    /// Fails when the request is unknown, already decided, or belongs to
    /// an event the caller does not host.
    pub async fn waitlist_seat(
        &self,
        host_id: HostId,
        id: SeatRequestId,
    ) -> Result<SeatRequest, ServiceError> {
        self.check_seat_request_owner(id, host_id).await?;
        self.settle_seat_request(id, BookingAction::Waitlist { id })
            .await
    }

    /// The host declines a pending request; the held seat is released
    ///
    /// # Errors
    ///
    /// Fails when the request is unknown, already decided, or belongs to
    /// an event the caller does not host.
    pub async fn decline_seat(
        &self,
        host_id: HostId,
        id: SeatRequestId,
    ) -> Result<SeatRequest, ServiceError> {
        self.check_seat_request_owner(id, host_id).await?;
        self.settle_seat_request(id, BookingAction::Decline { id })
            .await
    }

    /// Apply a seat-releasing decision and release exactly once
    async fn settle_seat_request(
        &self,
        id: SeatRequestId,
        action: BookingAction,
    ) -> Result<SeatRequest, ServiceError> {
        let (error, updated) = self
            .bookings
            .send_and_read(action, |s| (s.last_error.clone(), s.get(&id).cloned()))
            .await;

        if let Some(error) = error {
            // InvalidTransition on a repeated decision lands here, so the
            // release below runs only for the one winning transition.
            return Err(error.into());
        }
        let Some(request) = updated else {
            return Err(BookingError::UnknownRequest(id).into());
        };

        self.ledger
            .send(LedgerAction::Release {
                event_id: request.event_id,
            })
            .await;

        tracing::info!(%id, status = %request.status, "seat request settled");
        Ok(request)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The guest-visible catalog, joined with seat availability
    ///
    /// Visibility is recomputed from fresh snapshots on every call.
    pub async fn visible_events(&self) -> Vec<CatalogEntry> {
        let events = self.directory.state(DirectoryState::all).await;
        let collaborations = self.collaborations.state(CollaborationState::all).await;

        let visible = catalog::visible_events(&events, &collaborations);
        self.join_counters(visible).await
    }

    /// A single event record with its seat counter, regardless of
    /// visibility (hosts see their own unpublished events)
    pub async fn event(&self, event_id: EventId) -> Option<CatalogEntry> {
        let event = self.directory.state(|s| s.get(&event_id).cloned()).await?;
        let counter = self.ledger.state(|s| s.counter(&event_id).copied()).await;
        let counter = counter.unwrap_or(SeatCounter {
            seats_total: 0,
            seats_left: 0,
        });
        Some(CatalogEntry {
            event,
            seats_total: counter.seats_total,
            seats_left: counter.seats_left,
        })
    }

    /// Seat availability for one event
    ///
    /// # Errors
    ///
    /// Fails when no counter exists for the event.
    pub async fn availability(&self, event_id: EventId) -> Result<SeatCounter, ServiceError> {
        self.ledger
            .state(|s| s.counter(&event_id).copied())
            .await
            .ok_or_else(|| ServiceError::from(InventoryError::UnknownEvent(event_id)))
    }

    /// Events owned by a host, joined with seat availability
    pub async fn events_for_host(&self, host_id: HostId) -> Vec<CatalogEntry> {
        let events = self
            .directory
            .state(|s| {
                s.for_host(&host_id)
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        self.join_counters(events).await
    }

    /// Seat requests for an event, visible only to the owning host
    ///
    /// # Errors
    ///
    /// Fails when the event is unknown or the caller does not host it.
    pub async fn seat_requests_for_event(
        &self,
        host_id: HostId,
        event_id: EventId,
    ) -> Result<Vec<SeatRequest>, ServiceError> {
        self.check_event_owner(event_id, host_id).await?;
        Ok(self
            .bookings
            .state(|s| s.for_event(&event_id).into_iter().cloned().collect())
            .await)
    }

    /// Collaboration requests addressed to a host
    pub async fn collaborations_for_host(&self, host_id: HostId) -> Vec<CollaborationRequest> {
        self.collaborations
            .state(|s| s.for_host(&host_id).into_iter().cloned().collect())
            .await
    }

    /// Collaboration requests proposed by a cook
    pub async fn collaborations_for_cook(&self, cook_id: CookId) -> Vec<CollaborationRequest> {
        self.collaborations
            .state(|s| s.from_cook(&cook_id).into_iter().cloned().collect())
            .await
    }

    /// Seat requests made by a guest
    pub async fn seat_requests_for_guest(&self, guest_id: GuestId) -> Vec<SeatRequest> {
        self.bookings
            .state(|s| s.for_guest(&guest_id).into_iter().cloned().collect())
            .await
    }

    // ========================================================================
    // Recommendations + media
    // ========================================================================

    /// Rank the visible catalog against a guest's interests
    ///
    /// Consults the external ranking service when configured; any failure
    /// there silently falls back to the deterministic local scoring. Both
    /// paths produce the same output shape.
    pub async fn recommendations(&self, interests: &[String]) -> RecommendationsResponse {
        let candidates: Vec<CandidateEvent> = self
            .visible_events()
            .await
            .into_iter()
            .map(|entry| CandidateEvent {
                id: entry.event.id,
                cuisine: entry.event.cuisine,
                date: entry.event.date,
                seats_left: entry.seats_left,
            })
            .collect();

        if let Some(ranking) = &self.ranking {
            match ranking.rank(interests, &candidates).await {
                Ok(response) => return response,
                Err(error) => {
                    tracing::warn!(%error, "ranking service failed, using local scoring");
                },
            }
        }

        recommendations::rank(interests, &candidates, self.clock.now())
    }

    /// Search stock photos for event imagery
    ///
    /// Returns an empty list when no provider is configured or the
    /// provider fails.
    pub async fn search_photos(&self, query: &str, per_page: u32) -> PhotoSearchResponse {
        match &self.photos {
            Some(photos) => photos.search(query, per_page).await,
            None => PhotoSearchResponse::default(),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn join_counters(&self, events: Vec<DiningEvent>) -> Vec<CatalogEntry> {
        let mut entries = Vec::with_capacity(events.len());
        for event in events {
            let counter = self
                .ledger
                .state(|s| s.counter(&event.id).copied())
                .await
                .unwrap_or(SeatCounter {
                    seats_total: 0,
                    seats_left: 0,
                });
            entries.push(CatalogEntry {
                event,
                seats_total: counter.seats_total,
                seats_left: counter.seats_left,
            });
        }
        entries
    }

    async fn check_event_owner(
        &self,
        event_id: EventId,
        host_id: HostId,
    ) -> Result<(), ServiceError> {
        let Some(event) = self.directory.state(|s| s.get(&event_id).cloned()).await else {
            return Err(DirectoryError::UnknownEvent(event_id).into());
        };
        if event.host_id != host_id {
            return Err(ServiceError::Forbidden);
        }
        Ok(())
    }

    async fn check_collaboration_target(
        &self,
        id: CollaborationId,
        host_id: HostId,
    ) -> Result<(), ServiceError> {
        let Some(request) = self.collaborations.state(|s| s.get(&id).cloned()).await else {
            return Err(CollaborationError::UnknownRequest(id).into());
        };
        if request.to_host_id != host_id {
            return Err(ServiceError::Forbidden);
        }
        Ok(())
    }

    async fn check_seat_request_owner(
        &self,
        id: SeatRequestId,
        host_id: HostId,
    ) -> Result<(), ServiceError> {
        let Some(request) = self.bookings.state(|s| s.get(&id).cloned()).await else {
            return Err(BookingError::UnknownRequest(id).into());
        };
        self.check_event_owner(request.event_id, host_id).await
    }
}
