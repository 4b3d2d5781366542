//! End-to-end workflows through the services against the in-memory store.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use town_core::collections::{
    FormCollection, ReservationCollection, ResourceCollection, SubmissionCollection,
    TicketCollection,
};
use town_core::deletion::Deletability;
use town_core::error::TransitionError;
use town_core::links::Action;
use town_core::models::{
    EventState, ReservationStatus, ResourceKind, SubmissionField, SubmissionState,
};
use town_core::services::{
    EventService, EventUpdate, FormService, NewEvent, ReservationRequest, ReservationService,
    ServiceError, SubmissionUpdate, TicketService,
};
use town_core::types::{Identity, ReservationToken};
use town_core::{HandlerError, TicketState};
use town_testing::{EchoRenderer, InMemoryStore, StaticLinks, fixtures, init_tracing, test_clock};

struct Town {
    store: InMemoryStore,
    tickets: TicketService,
}

impl Town {
    fn new() -> Self {
        init_tracing();
        let store = InMemoryStore::new();
        let tickets = TicketService::new(store.collections(), Arc::new(test_clock()));
        Self { store, tickets }
    }

    fn forms(&self) -> FormService {
        FormService::new(self.tickets.clone())
    }

    fn reservations(&self) -> ReservationService {
        ReservationService::new(self.tickets.clone())
    }

    fn events(&self) -> EventService {
        EventService::new(self.tickets.clone())
    }
}

fn staff() -> Identity {
    Identity::staff("editor")
}

fn texts(actions: &[Action]) -> Vec<&str> {
    actions.iter().map(Action::text).collect()
}

fn concert() -> NewEvent {
    NewEvent {
        title: "Open Air Concert".into(),
        description: "Brass band".into(),
        location: "Market Square".into(),
        start: fixtures::at(2025, 6, 21, 19, 0),
        end: fixtures::at(2025, 6, 21, 22, 0),
        submitter_email: Some("organiser@example.org".into()),
    }
}

fn booking(email: &str, quota: u32) -> ReservationRequest {
    ReservationRequest {
        email: email.into(),
        quota,
        start: None,
        end: None,
    }
}

// ============================================================================
// Forms
// ============================================================================

#[tokio::test]
async fn completing_a_submission_opens_a_form_ticket() {
    let town = Town::new();
    let form = fixtures::form("complaint", "Complaint");
    town.store.insert_form(&form).await.unwrap();

    let forms = town.forms();
    let submission = forms
        .submit(
            "complaint",
            "",
            "citizen@example.org",
            vec![SubmissionField::new("Message", "Noise")],
        )
        .await
        .unwrap();
    assert_eq!(submission.title, "Complaint");
    assert_eq!(submission.state, SubmissionState::Pending);

    let (submission, ticket) = forms.complete(submission.id).await.unwrap();
    assert_eq!(submission.state, SubmissionState::Complete);
    assert_eq!(ticket.handler_code, "FRM");
    assert_eq!(ticket.handler_id, submission.id.handler_id());
    assert_eq!(ticket.state, TicketState::Open);
    assert_eq!(ticket.title, "Complaint");
    assert_eq!(ticket.group, "Complaint");
    assert!(ticket.number.starts_with("FRM-"));

    let again = forms.complete(submission.id).await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
    assert_eq!(town.store.ticket_count(), 1);
}

#[tokio::test]
async fn completion_blocked_by_an_existing_ticket_leaves_the_submission_pending() {
    let town = Town::new();
    let form = fixtures::form("complaint", "Complaint");
    town.store.insert_form(&form).await.unwrap();
    let submission = fixtures::submission(&form, "Street light");
    town.store.insert_submission(&submission).await.unwrap();
    town.store
        .insert_ticket(&fixtures::ticket("FRM", &submission.id.handler_id()))
        .await
        .unwrap();

    let result = town.forms().complete(submission.id).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let stored = town.store.submission(submission.id).await.unwrap().unwrap();
    assert_eq!(stored.state, SubmissionState::Pending);
    assert_eq!(town.store.ticket_count(), 1);
}

#[tokio::test]
async fn submissions_need_an_existing_form_and_an_email() {
    let town = Town::new();
    town.store
        .insert_form(&fixtures::form("complaint", "Complaint"))
        .await
        .unwrap();
    let forms = town.forms();

    let missing = forms.submit("unknown", "t", "a@b.c", Vec::new()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let no_email = forms.submit("complaint", "t", "  ", Vec::new()).await;
    assert!(matches!(no_email, Err(ServiceError::Invalid(_))));
}

#[tokio::test]
async fn completed_submissions_are_edited_by_staff_only() {
    let town = Town::new();
    town.store
        .insert_form(&fixtures::form("complaint", "Complaint"))
        .await
        .unwrap();
    let forms = town.forms();
    let submission = forms
        .submit("complaint", "Noise", "citizen@example.org", Vec::new())
        .await
        .unwrap();

    let edited = forms
        .edit(
            submission.id,
            &Identity::Anonymous,
            SubmissionUpdate {
                title: Some("Loud noise".into()),
                ..SubmissionUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.title, "Loud noise");

    forms.complete(submission.id).await.unwrap();

    let anonymous = forms
        .edit(submission.id, &Identity::Anonymous, SubmissionUpdate::default())
        .await;
    assert!(matches!(anonymous, Err(ServiceError::Forbidden(_))));

    let by_staff = forms
        .edit(
            submission.id,
            &staff(),
            SubmissionUpdate {
                email: Some("other@example.org".into()),
                ..SubmissionUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_staff.email, "other@example.org");
}

// ============================================================================
// Tickets
// ============================================================================

#[tokio::test]
async fn opening_twice_for_the_same_object_conflicts() {
    let town = Town::new();
    let (event, _) = town.events().submit(concert()).await.unwrap();

    let second = town.tickets.open("EVN", &event.id.handler_id()).await;
    assert!(matches!(second, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn unknown_handler_codes_are_rejected() {
    let town = Town::new();
    let result = town.tickets.open("XYZ", "00000000000000000000000000000000").await;
    assert_eq!(
        result.unwrap_err(),
        ServiceError::Handler(HandlerError::UnknownHandlerType("XYZ".into()))
    );
}

#[tokio::test]
async fn transitions_follow_the_lifecycle() {
    let town = Town::new();
    let (_, ticket) = town.events().submit(concert()).await.unwrap();

    let anonymous = town.tickets.accept(ticket.id, Identity::Anonymous).await;
    assert!(matches!(
        anonymous,
        Err(ServiceError::Transition(TransitionError::NotPermitted(_)))
    ));

    let closed_early = town.tickets.close(ticket.id, staff()).await;
    assert!(matches!(
        closed_early,
        Err(ServiceError::Transition(TransitionError::InvalidTransition { .. }))
    ));

    let pending = town.tickets.accept(ticket.id, staff()).await.unwrap();
    assert_eq!(pending.state, TicketState::Pending);
    assert_eq!(pending.user.as_deref(), Some("editor"));

    let closed = town.tickets.close(ticket.id, staff()).await.unwrap();
    assert_eq!(closed.state, TicketState::Closed);

    let reopened = town.tickets.reopen(ticket.id, staff()).await.unwrap();
    assert_eq!(reopened.state, TicketState::Open);
    assert!(reopened.user.is_none());

    let stored = town.tickets.ticket(ticket.id).await.unwrap();
    assert_eq!(stored, reopened);
    assert_eq!(town.tickets.list(Some(TicketState::Open)).await.unwrap().len(), 1);
    assert!(town.tickets.list(Some(TicketState::Closed)).await.unwrap().is_empty());
}

#[tokio::test]
async fn transitions_refresh_title_snapshot() {
    let town = Town::new();
    let events = town.events();
    let (event, ticket) = events.submit(concert()).await.unwrap();

    events
        .edit(
            event.id,
            &staff(),
            EventUpdate {
                title: Some("Jazz Night".into()),
                ..EventUpdate::default()
            },
        )
        .await
        .unwrap();

    let pending = town.tickets.accept(ticket.id, staff()).await.unwrap();
    assert_eq!(pending.title, "Jazz Night");
    assert_eq!(pending.group, "Event");
}

// ============================================================================
// Ticket detail and the action resolver
// ============================================================================

#[tokio::test]
async fn anonymous_viewers_get_no_actions() {
    let town = Town::new();
    let (_, ticket) = town.events().submit(concert()).await.unwrap();

    let detail = town
        .tickets
        .detail(
            ticket.id,
            &Identity::Anonymous,
            &StaticLinks::default(),
            &EchoRenderer::new(),
        )
        .await
        .unwrap();

    assert!(detail.actions.is_empty());
    assert!(!detail.deleted);
    assert_eq!(detail.title, "Open Air Concert");
}

#[tokio::test]
async fn handler_actions_only_show_while_pending() {
    let town = Town::new();
    let (_, ticket) = town.events().submit(concert()).await.unwrap();
    let links = StaticLinks::default();
    let renderer = EchoRenderer::new();

    let open = town
        .tickets
        .detail(ticket.id, &staff(), &links, &renderer)
        .await
        .unwrap();
    assert_eq!(texts(&open.actions), ["Accept ticket"]);

    town.tickets.accept(ticket.id, staff()).await.unwrap();
    let pending = town
        .tickets
        .detail(ticket.id, &staff(), &links, &renderer)
        .await
        .unwrap();
    assert_eq!(
        texts(&pending.actions),
        ["Publish event", "Edit event", "Delete event", "Close ticket"]
    );

    town.tickets.close(ticket.id, staff()).await.unwrap();
    let closed = town
        .tickets
        .detail(ticket.id, &staff(), &links, &renderer)
        .await
        .unwrap();
    assert_eq!(texts(&closed.actions), ["Reopen ticket"]);
    assert!(closed.actions[0].url().ends_with("/reopen"));
}

// ============================================================================
// Reservations
// ============================================================================

#[tokio::test]
async fn reservation_workflow_opens_and_resolves_ticket() {
    let town = Town::new();
    let mut resource = fixtures::daypass();
    resource.definition = Some("daypass-details".into());
    let allocation = fixtures::allocation(
        &resource,
        fixtures::at(2025, 3, 1, 0, 0),
        fixtures::at(2025, 3, 1, 23, 59),
        4,
    );
    town.store.insert_resource(&resource).await.unwrap();
    town.store.insert_allocation(&allocation).await.unwrap();

    let reservations = town.reservations();
    let receipt = reservations
        .reserve(
            allocation.id,
            booking("citizen@example.org", 2),
            Some("browser".into()),
        )
        .await
        .unwrap();
    assert!(receipt.needs_details);
    assert_eq!(receipt.reservation.start, allocation.start);

    let foreign = reservations
        .finalize(receipt.token, &Identity::Anonymous, Some("other"))
        .await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    let ticket = reservations
        .finalize(receipt.token, &Identity::Anonymous, Some("browser"))
        .await
        .unwrap();
    assert_eq!(ticket.handler_code, "RSV");
    assert_eq!(ticket.title, "01.03.2025 (2)");
    assert_eq!(ticket.group, "SBB Day Pass");

    let stored = town.store.reservations_by_token(receipt.token).await.unwrap();
    assert_eq!(stored[0].status, ReservationStatus::Approved);
    let details = town
        .store
        .submission(town_core::handlers::reservation::submission_id_for(receipt.token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(details.state, SubmissionState::Complete);

    let twice = reservations
        .finalize(receipt.token, &Identity::Anonymous, Some("browser"))
        .await;
    assert!(matches!(twice, Err(ServiceError::Forbidden(_))));

    let accepted = reservations.accept(receipt.token, &staff()).await.unwrap();
    assert!(accepted.iter().all(|r| r.accepted));

    town.tickets.accept(ticket.id, staff()).await.unwrap();
    let detail = town
        .tickets
        .detail(
            ticket.id,
            &staff(),
            &StaticLinks::default(),
            &EchoRenderer::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        texts(&detail.actions),
        ["Reject reservation", "Edit details", "Close ticket"]
    );

    let removed = reservations.reject(receipt.token, &staff()).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(town.store.reservation_count(), 0);

    let detail = town
        .tickets
        .detail(
            ticket.id,
            &staff(),
            &StaticLinks::default(),
            &EchoRenderer::new(),
        )
        .await
        .unwrap();
    assert!(detail.deleted);
    assert_eq!(detail.title, "01.03.2025 (2)");
    assert_eq!(texts(&detail.actions), ["Close ticket"]);
    assert!(detail.summary.as_str().contains("has been deleted"));
}

#[tokio::test]
async fn reservation_details_are_completed_only_by_finalizing() {
    let town = Town::new();
    let mut resource = fixtures::daypass();
    resource.definition = Some("daypass-details".into());
    let allocation = fixtures::allocation(
        &resource,
        fixtures::at(2025, 3, 1, 0, 0),
        fixtures::at(2025, 3, 1, 23, 59),
        4,
    );
    town.store.insert_resource(&resource).await.unwrap();
    town.store.insert_allocation(&allocation).await.unwrap();

    let reservations = town.reservations();
    let receipt = reservations
        .reserve(allocation.id, booking("citizen@example.org", 1), Some("browser".into()))
        .await
        .unwrap();
    let details_id = town_core::handlers::reservation::submission_id_for(receipt.token);

    let details = town.store.submission(details_id).await.unwrap().unwrap();
    assert_eq!(details.reservation, Some(receipt.token));
    assert!(details.is_reservation_details());

    let completed = town.forms().complete(details_id).await;
    assert!(matches!(completed, Err(ServiceError::Forbidden(_))));
    assert_eq!(town.store.ticket_count(), 0);

    let ticket = reservations
        .finalize(receipt.token, &Identity::Anonymous, Some("browser"))
        .await
        .unwrap();
    assert_eq!(ticket.handler_code, "RSV");
    assert_eq!(town.store.ticket_count(), 1);

    let details = town.store.submission(details_id).await.unwrap().unwrap();
    assert_eq!(details.state, SubmissionState::Complete);
}

#[tokio::test]
async fn tickets_of_other_handler_types_do_not_block_finalizing() {
    let town = Town::new();
    let resource = fixtures::daypass();
    let token = ReservationToken::new();
    town.store.insert_resource(&resource).await.unwrap();
    town.store
        .insert_reservation(&fixtures::reservation(&resource, token, (2025, 3, 1), 1))
        .await
        .unwrap();
    town.store
        .insert_ticket(&fixtures::ticket("FRM", &token.handler_id()))
        .await
        .unwrap();

    let ticket = town
        .reservations()
        .finalize(token, &staff(), None)
        .await
        .unwrap();
    assert_eq!(ticket.handler_code, "RSV");
    assert_eq!(
        town.store
            .ticket_by_handler("RSV", &token.handler_id())
            .await
            .unwrap()
            .map(|t| t.id),
        Some(ticket.id)
    );
}

#[tokio::test]
async fn resources_of_unknown_type_cannot_be_reserved() {
    let town = Town::new();
    let resource = fixtures::resource(ResourceKind::Other("parking".into()), "Parking");
    let allocation = fixtures::allocation(
        &resource,
        fixtures::at(2025, 5, 2, 0, 0),
        fixtures::at(2025, 5, 2, 23, 59),
        3,
    );
    town.store.insert_resource(&resource).await.unwrap();
    town.store.insert_allocation(&allocation).await.unwrap();

    let result = town
        .reservations()
        .reserve(allocation.id, booking("a@b.c", 1), Some("browser".into()))
        .await;
    assert!(matches!(result, Err(ServiceError::Invalid(_))));
    assert_eq!(town.store.reservation_count(), 0);
}

#[tokio::test]
async fn failed_finalize_leaves_reservations_pending() {
    let town = Town::new();
    let resource = fixtures::resource(ResourceKind::Other("parking".into()), "Parking");
    let token = ReservationToken::new();
    town.store.insert_resource(&resource).await.unwrap();
    town.store
        .insert_reservation(&fixtures::reservation(&resource, token, (2025, 5, 2), 1))
        .await
        .unwrap();

    let result = town
        .reservations()
        .finalize(token, &Identity::Anonymous, Some("session"))
        .await;
    assert_eq!(
        result.unwrap_err(),
        ServiceError::Handler(HandlerError::UnsupportedResourceType("parking".into()))
    );

    let stored = town.store.reservations_by_token(token).await.unwrap();
    assert_eq!(stored[0].status, ReservationStatus::Pending);
    assert_eq!(town.store.ticket_count(), 0);

    let retried = town
        .reservations()
        .finalize(token, &Identity::Anonymous, Some("session"))
        .await;
    assert!(matches!(retried, Err(ServiceError::Handler(_))));
}

#[tokio::test]
async fn reservations_are_checked_against_the_allocation() {
    let town = Town::new();
    let resource = fixtures::room();
    let mut allocation = fixtures::allocation(
        &resource,
        fixtures::at(2025, 4, 7, 8, 0),
        fixtures::at(2025, 4, 7, 12, 0),
        1,
    );
    allocation.partly_available = true;
    town.store.insert_resource(&resource).await.unwrap();
    town.store.insert_allocation(&allocation).await.unwrap();
    let reservations = town.reservations();

    let too_many = reservations
        .reserve(allocation.id, booking("a@b.c", 2), None)
        .await;
    assert!(matches!(too_many, Err(ServiceError::Invalid(_))));

    let outside = reservations
        .reserve(
            allocation.id,
            ReservationRequest {
                start: Some(fixtures::at(2025, 4, 7, 11, 0)),
                end: Some(fixtures::at(2025, 4, 7, 13, 0)),
                ..booking("a@b.c", 1)
            },
            None,
        )
        .await;
    assert!(matches!(outside, Err(ServiceError::Invalid(_))));

    let inside = reservations
        .reserve(
            allocation.id,
            ReservationRequest {
                start: Some(fixtures::at(2025, 4, 7, 9, 30)),
                end: Some(fixtures::at(2025, 4, 7, 11, 0)),
                ..booking("a@b.c", 1)
            },
            None,
        )
        .await
        .unwrap();
    assert!(!inside.needs_details);

    let ticket = reservations
        .finalize(inside.token, &staff(), None)
        .await
        .unwrap();
    assert_eq!(ticket.title, "07.04.2025 09:30 - 11:00");
}

#[tokio::test]
async fn anonymous_users_cannot_reject() {
    let town = Town::new();
    let result = town
        .reservations()
        .reject(ReservationToken::new(), &Identity::Anonymous)
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let missing = town
        .reservations()
        .reject(ReservationToken::new(), &staff())
        .await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

// ============================================================================
// Events and the deletion rule
// ============================================================================

#[tokio::test]
async fn event_with_a_ticket_cannot_be_deleted() {
    let town = Town::new();
    let events = town.events();
    let (event, ticket) = events.submit(concert()).await.unwrap();
    assert_eq!(event.state, EventState::Submitted);

    let (_, deletable) = events.detail(event.id).await.unwrap();
    assert_eq!(
        deletable,
        Deletability::Blocked {
            ticket: ticket.id,
            number: ticket.number.clone(),
        }
    );

    let result = events.delete(event.id, &staff()).await;
    assert_eq!(
        result,
        Err(ServiceError::DeletionBlocked {
            number: ticket.number
        })
    );
    assert!(events.event(event.id).await.is_ok());
}

#[tokio::test]
async fn event_without_a_ticket_can_be_deleted() {
    let town = Town::new();
    let events = town.events();
    let event = fixtures::event(EventState::Submitted);
    town_core::collections::EventCollection::insert_event(&town.store, &event)
        .await
        .unwrap();

    let anonymous = events.delete(event.id, &Identity::Anonymous).await;
    assert!(matches!(anonymous, Err(ServiceError::Forbidden(_))));

    events.delete(event.id, &staff()).await.unwrap();
    assert!(matches!(
        events.event(event.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn tickets_of_other_handler_types_do_not_block_event_deletion() {
    let town = Town::new();
    let events = town.events();
    let event = fixtures::event(EventState::Submitted);
    town_core::collections::EventCollection::insert_event(&town.store, &event)
        .await
        .unwrap();
    town.store
        .insert_ticket(&fixtures::ticket("FRM", &event.id.handler_id()))
        .await
        .unwrap();

    let (_, deletable) = events.detail(event.id).await.unwrap();
    assert_eq!(deletable, Deletability::Deletable);
    events.delete(event.id, &staff()).await.unwrap();
}

#[tokio::test]
async fn publishing_and_withdrawing_events() {
    let town = Town::new();
    let events = town.events();
    let (event, _) = events.submit(concert()).await.unwrap();

    let refused = events.publish(event.id, Identity::Anonymous).await;
    assert!(matches!(
        refused,
        Err(ServiceError::Transition(TransitionError::NotPermitted(_)))
    ));

    let published = events.publish(event.id, staff()).await.unwrap();
    assert_eq!(published.state, EventState::Published);

    let withdrawn = events.withdraw(event.id, staff()).await.unwrap();
    assert_eq!(withdrawn.state, EventState::Withdrawn);
    assert_eq!(
        events.event(event.id).await.unwrap().state,
        EventState::Withdrawn
    );
}

#[tokio::test]
async fn invalid_events_are_refused() {
    let town = Town::new();
    let events = town.events();

    let untitled = events
        .submit(NewEvent {
            title: " ".into(),
            ..concert()
        })
        .await;
    assert!(matches!(untitled, Err(ServiceError::Invalid(_))));

    let backwards = events
        .submit(NewEvent {
            end: fixtures::at(2025, 6, 21, 18, 0),
            ..concert()
        })
        .await;
    assert!(matches!(backwards, Err(ServiceError::Invalid(_))));
    assert_eq!(town.store.ticket_count(), 0);

    let unused = town.store.ticket_by_handler("EVN", "missing").await.unwrap();
    assert!(unused.is_none());
}
