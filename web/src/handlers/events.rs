//! Event endpoints: submit, view, edit, publish, withdraw and delete.

use super::{ReturnTo, respond};
use crate::error::AppError;
use crate::extractors::{RequestLinks, RequireStaff};
use crate::metrics::{record_event_action, record_ticket_opened};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use town_core::Ticket;
use town_core::deletion::Deletability;
use town_core::models::Event;
use town_core::services::{EventUpdate, NewEvent};
use town_core::types::EventId;
use uuid::Uuid;

/// A submitted event and its ticket.
#[derive(Debug, Serialize)]
pub struct SubmittedEvent {
    /// The stored event
    pub event: Event,
    /// The new EVN ticket
    pub ticket: Ticket,
}

/// An event and whether staff may delete it right now.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    /// The event
    pub event: Event,
    /// Deletion eligibility
    pub deletable: Deletability,
}

/// `POST /api/events`
///
/// # Errors
///
/// 400 for an empty title or an end before the start.
pub async fn submit_event(
    State(state): State<AppState>,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<SubmittedEvent>), AppError> {
    let (event, ticket) = state.events.submit(new_event).await?;
    record_ticket_opened(&ticket.handler_code);

    Ok((StatusCode::CREATED, Json(SubmittedEvent { event, ticket })))
}

/// `GET /api/events/{id}`
///
/// # Errors
///
/// 404 for unknown events.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>, AppError> {
    let (event, deletable) = state.events.detail(EventId::from_uuid(id)).await?;
    Ok(Json(EventDetail { event, deletable }))
}

/// `PUT /api/events/{id}`
///
/// # Errors
///
/// 401 for anonymous callers, 404 for unknown events, 400 for invalid edits.
pub async fn edit_event(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    Path(id): Path<Uuid>,
    Json(update): Json<EventUpdate>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .events
        .edit(EventId::from_uuid(id), &identity, update)
        .await?;
    Ok(Json(event))
}

/// `POST /api/events/{id}/publish`
///
/// # Errors
///
/// 401 for anonymous callers, 409 unless the event is submitted or withdrawn.
pub async fn publish_event(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .publish(EventId::from_uuid(id), identity)
        .await?;
    record_event_action("published");

    Ok(respond(event, return_to, &links))
}

/// `POST /api/events/{id}/withdraw`
///
/// # Errors
///
/// 401 for anonymous callers, 409 unless the event is published.
pub async fn withdraw_event(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .withdraw(EventId::from_uuid(id), identity)
        .await?;
    record_event_action("withdrawn");

    Ok(respond(event, return_to, &links))
}

/// `DELETE /api/events/{id}`
///
/// # Errors
///
/// 401 for anonymous callers, 404 for unknown events, 409 while a ticket
/// references the event.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .events
        .delete(EventId::from_uuid(id), &identity)
        .await?;
    record_event_action("deleted");

    Ok(StatusCode::NO_CONTENT)
}
