//! Ticket endpoints: list, detail and the accept/close/reopen transitions.

use super::{ReturnTo, respond};
use crate::error::AppError;
use crate::extractors::{RequestLinks, RequireStaff};
use crate::metrics::record_ticket_transition;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use town_core::lifecycle::TicketAction;
use town_core::services::TicketDetail;
use town_core::types::TicketId;
use town_core::{Ticket, TicketState};
use uuid::Uuid;

/// Query parameters of `GET /api/tickets`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `open`, `pending` or `closed`
    pub state: Option<String>,
}

/// `GET /api/tickets?state=`
///
/// # Errors
///
/// 400 for an unknown state, 401 for anonymous callers.
pub async fn list_tickets(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let filter = query
        .state
        .as_deref()
        .map(str::parse::<TicketState>)
        .transpose()
        .map_err(AppError::bad_request)?;

    Ok(Json(state.tickets.list(filter).await?))
}

/// `GET /api/tickets/{id}`: handler data, rendered summary and the
/// actions available to the caller.
///
/// # Errors
///
/// 404 for unknown tickets, 500 if the ticket's handler cannot be resolved.
pub async fn ticket_detail(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketDetail>, AppError> {
    let detail = state
        .tickets
        .detail(TicketId::from_uuid(id), &identity, &links, &*state.renderer)
        .await?;
    Ok(Json(detail))
}

async fn transition(
    state: &AppState,
    id: Uuid,
    action: TicketAction,
    name: &'static str,
) -> Result<Ticket, AppError> {
    let ticket = state
        .tickets
        .transition(TicketId::from_uuid(id), action)
        .await?;
    record_ticket_transition(name);
    Ok(ticket)
}

/// `POST /api/tickets/{id}/accept`
///
/// # Errors
///
/// 401 for anonymous callers, 409 unless the ticket is open.
pub async fn accept_ticket(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let action = TicketAction::Accept { actor: identity };
    let ticket = transition(&state, id, action, "accept").await?;
    Ok(respond(ticket, return_to, &links))
}

/// `POST /api/tickets/{id}/close`
///
/// # Errors
///
/// 401 for anonymous callers, 409 unless the ticket is pending.
pub async fn close_ticket(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let action = TicketAction::Close { actor: identity };
    let ticket = transition(&state, id, action, "close").await?;
    Ok(respond(ticket, return_to, &links))
}

/// `POST /api/tickets/{id}/reopen`. Reopening an open ticket succeeds
/// without changing it.
///
/// # Errors
///
/// 401 for anonymous callers, 409 for pending tickets.
pub async fn reopen_ticket(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(id): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let action = TicketAction::Reopen { actor: identity };
    let ticket = transition(&state, id, action, "reopen").await?;
    Ok(respond(ticket, return_to, &links))
}
