//! Guest-facing event catalog: a pure read-side filter.
//!
//! An event is guest-visible iff it has a cook assigned *and* there exists
//! an accepted collaboration linking that cook to the event's host. The
//! predicate is recomputed on every read - there is no cached visibility
//! flag to go stale when a collaboration changes independently of the
//! event record.

use crate::types::{CollaborationRequest, CollaborationStatus, DiningEvent};

/// Whether a single event is guest-visible given the current collaborations
#[must_use]
pub fn is_visible(event: &DiningEvent, collaborations: &[CollaborationRequest]) -> bool {
    if event.is_cancelled() {
        return false;
    }

    let Some(cook_id) = event.cook_id else {
        return false;
    };

    collaborations.iter().any(|req| {
        req.to_host_id == event.host_id
            && req.from_cook_id == cook_id
            && req.status == CollaborationStatus::Accepted
    })
}

/// Filter the raw event list down to the guest-visible catalog
///
/// Pure function with no side effects; the caller passes fresh snapshots
/// of both entity sets on every read.
#[must_use]
pub fn visible_events(
    events: &[DiningEvent],
    collaborations: &[CollaborationRequest],
) -> Vec<DiningEvent> {
    events
        .iter()
        .filter(|event| is_visible(event, collaborations))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        CollaborationId, CookId, EventId, EventStatus, HostId,
    };
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn event(host_id: HostId, cook_id: Option<CookId>) -> DiningEvent {
        DiningEvent {
            id: EventId::new(),
            title: "Harvest dinner".to_string(),
            cuisine: "Lebanese".to_string(),
            host_id,
            cook_id,
            date: NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            location: "Rooftop garden".to_string(),
            images: vec![],
            status: EventStatus::Upcoming,
            created_at: Utc::now(),
        }
    }

    fn collaboration(
        cook_id: CookId,
        host_id: HostId,
        status: CollaborationStatus,
    ) -> CollaborationRequest {
        CollaborationRequest {
            id: CollaborationId::new(),
            from_cook_id: cook_id,
            to_host_id: host_id,
            event_id: None,
            message: "Dinner proposal".to_string(),
            proposed_dishes: vec![],
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn visible_with_cook_and_accepted_collaboration() {
        let host = HostId::new();
        let cook = CookId::new();
        let events = vec![event(host, Some(cook))];
        let collabs = vec![collaboration(cook, host, CollaborationStatus::Accepted)];

        assert_eq!(visible_events(&events, &collabs).len(), 1);
    }

    #[test]
    fn hidden_without_cook() {
        let host = HostId::new();
        let cook = CookId::new();
        let events = vec![event(host, None)];
        let collabs = vec![collaboration(cook, host, CollaborationStatus::Accepted)];

        assert!(visible_events(&events, &collabs).is_empty());
    }

    #[test]
    fn hidden_while_collaboration_pending() {
        let host = HostId::new();
        let cook = CookId::new();
        let events = vec![event(host, Some(cook))];
        let collabs = vec![collaboration(cook, host, CollaborationStatus::Pending)];

        assert!(visible_events(&events, &collabs).is_empty());
    }

    #[test]
    fn hidden_when_accepted_collaboration_belongs_to_other_pairing() {
        let host = HostId::new();
        let cook = CookId::new();
        let events = vec![event(host, Some(cook))];
        // Accepted, but for a different host
        let collabs = vec![collaboration(
            cook,
            HostId::new(),
            CollaborationStatus::Accepted,
        )];

        assert!(visible_events(&events, &collabs).is_empty());
    }

    #[test]
    fn declining_after_the_fact_hides_the_event() {
        let host = HostId::new();
        let cook = CookId::new();
        let events = vec![event(host, Some(cook))];

        let accepted = vec![collaboration(cook, host, CollaborationStatus::Accepted)];
        assert_eq!(visible_events(&events, &accepted).len(), 1);

        // The next read sees the new collaboration status immediately
        let declined = vec![collaboration(cook, host, CollaborationStatus::Declined)];
        assert!(visible_events(&events, &declined).is_empty());
    }

    #[test]
    fn cancelled_events_are_hidden() {
        let host = HostId::new();
        let cook = CookId::new();
        let mut cancelled = event(host, Some(cook));
        cancelled.status = EventStatus::Cancelled;
        let collabs = vec![collaboration(cook, host, CollaborationStatus::Accepted)];

        assert!(visible_events(&[cancelled], &collabs).is_empty());
    }
}
