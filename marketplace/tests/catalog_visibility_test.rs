//! Catalog visibility integration tests.
//!
//! An event reaches the guest catalog only once a cook is assigned and a
//! matching accepted collaboration exists; both conditions are recomputed
//! on every read.
//!
//! Run with: `cargo test --test catalog_visibility_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use chrono::{Duration, NaiveTime};
use std::sync::Arc;
use supperclub_marketplace::aggregates::CollaborationError;
use supperclub_marketplace::app::{
    MarketplaceService, NewCollaboration, NewEvent, ServiceError,
};
use supperclub_marketplace::types::{CollaborationStatus, CookId, HostId};
use supperclub_core::environment::Clock;
use supperclub_testing::mocks::{SequentialIds, test_clock};

fn service() -> MarketplaceService {
    MarketplaceService::new(Arc::new(test_clock()), Arc::new(SequentialIds::new()))
}

fn new_event(title: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        cuisine: "Mexican".to_string(),
        date: test_clock().now().date_naive() + Duration::days(5),
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        location: "Patio".to_string(),
        images: vec![],
        seats_total: 6,
    }
}

fn proposal(host: HostId, event_id: supperclub_marketplace::types::EventId) -> NewCollaboration {
    NewCollaboration {
        to_host_id: host,
        event_id: Some(event_id),
        message: "I'd love to cook tacos al pastor for your guests".to_string(),
        proposed_dishes: vec!["Tacos al pastor".to_string(), "Elote".to_string()],
    }
}

#[tokio::test]
async fn accepting_a_collaboration_publishes_the_event() {
    let service = service();
    let host = HostId::new();
    let cook = CookId::new();

    let entry = service.create_event(host, new_event("Taco night")).await.unwrap();
    let event_id = entry.event.id;

    // Freshly created: no cook, not visible
    assert!(service.visible_events().await.is_empty());

    let request = service
        .propose_collaboration(cook, proposal(host, event_id))
        .await
        .unwrap();
    assert_eq!(request.status, CollaborationStatus::Pending);

    // Still pending: not visible
    assert!(service.visible_events().await.is_empty());

    // Acceptance assigns the cook and the event goes live
    let accepted = service.accept_collaboration(host, request.id).await.unwrap();
    assert_eq!(accepted.status, CollaborationStatus::Accepted);

    let visible = service.visible_events().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].event.id, event_id);
    assert_eq!(visible[0].event.cook_id, Some(cook));
    assert_eq!(visible[0].seats_left, 6);
}

#[tokio::test]
async fn declined_collaborations_never_publish() {
    let service = service();
    let host = HostId::new();

    let entry = service.create_event(host, new_event("Quiet night")).await.unwrap();
    let request = service
        .propose_collaboration(CookId::new(), proposal(host, entry.event.id))
        .await
        .unwrap();

    service.decline_collaboration(host, request.id).await.unwrap();

    assert!(service.visible_events().await.is_empty());
    // Declining never mutates the event
    let event = service.event(entry.event.id).await.unwrap();
    assert!(event.event.cook_id.is_none());
}

#[tokio::test]
async fn decisions_are_final() {
    let service = service();
    let host = HostId::new();
    let entry = service.create_event(host, new_event("One shot")).await.unwrap();

    let request = service
        .propose_collaboration(CookId::new(), proposal(host, entry.event.id))
        .await
        .unwrap();
    service.accept_collaboration(host, request.id).await.unwrap();

    // No re-decision in either direction
    let declined = service.decline_collaboration(host, request.id).await;
    assert!(matches!(
        declined,
        Err(ServiceError::Collaboration(
            CollaborationError::InvalidTransition(..)
        ))
    ));
    let accepted_again = service.accept_collaboration(host, request.id).await;
    assert!(matches!(
        accepted_again,
        Err(ServiceError::Collaboration(
            CollaborationError::InvalidTransition(..)
        ))
    ));
}

#[tokio::test]
async fn cook_slot_goes_to_the_first_accepted_collaboration() {
    let service = service();
    let host = HostId::new();
    let first_cook = CookId::new();
    let second_cook = CookId::new();

    let entry = service.create_event(host, new_event("Contested")).await.unwrap();
    let event_id = entry.event.id;

    let first = service
        .propose_collaboration(first_cook, proposal(host, event_id))
        .await
        .unwrap();
    let second = service
        .propose_collaboration(second_cook, proposal(host, event_id))
        .await
        .unwrap();

    service.accept_collaboration(host, first.id).await.unwrap();
    // The second acceptance stands as accepted but does not steal the slot
    let second_accepted = service.accept_collaboration(host, second.id).await.unwrap();
    assert_eq!(second_accepted.status, CollaborationStatus::Accepted);

    let event = service.event(event_id).await.unwrap();
    assert_eq!(event.event.cook_id, Some(first_cook));
}

#[tokio::test]
async fn proposals_without_an_event_assign_no_cook() {
    let service = service();
    let host = HostId::new();

    let entry = service.create_event(host, new_event("Unlinked")).await.unwrap();
    let request = service
        .propose_collaboration(
            CookId::new(),
            NewCollaboration {
                to_host_id: host,
                event_id: None,
                message: "General interest in collaborating".to_string(),
                proposed_dishes: vec![],
            },
        )
        .await
        .unwrap();

    service.accept_collaboration(host, request.id).await.unwrap();

    let event = service.event(entry.event.id).await.unwrap();
    assert!(event.event.cook_id.is_none());
    assert!(service.visible_events().await.is_empty());
}

#[tokio::test]
async fn cancelling_a_live_event_removes_it_from_the_catalog() {
    let service = service();
    let host = HostId::new();
    let cook = CookId::new();

    let entry = service.create_event(host, new_event("Short lived")).await.unwrap();
    let request = service
        .propose_collaboration(cook, proposal(host, entry.event.id))
        .await
        .unwrap();
    service.accept_collaboration(host, request.id).await.unwrap();
    assert_eq!(service.visible_events().await.len(), 1);

    service.cancel_event(host, entry.event.id).await.unwrap();

    // The record survives with its flag; the catalog recomputes without it
    assert!(service.visible_events().await.is_empty());
    assert!(service.event(entry.event.id).await.unwrap().event.is_cancelled());
}

#[tokio::test]
async fn only_the_target_host_may_decide() {
    let service = service();
    let host = HostId::new();
    let entry = service.create_event(host, new_event("Private")).await.unwrap();

    let request = service
        .propose_collaboration(CookId::new(), proposal(host, entry.event.id))
        .await
        .unwrap();

    let result = service
        .accept_collaboration(HostId::new(), request.id)
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}
