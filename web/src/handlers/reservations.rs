//! Reservation endpoints: reserve, finalize, accept and reject.

use super::{ReturnTo, respond};
use crate::error::AppError;
use crate::extractors::{RequestLinks, RequireStaff, SessionId, Viewer};
use crate::metrics::{record_reservation_decision, record_ticket_opened};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use town_core::Ticket;
use town_core::services::{ReservationReceipt, ReservationRequest};
use town_core::types::{AllocationId, ReservationToken};
use uuid::Uuid;

/// Outcome of a rejection.
#[derive(Debug, Serialize)]
pub struct Rejected {
    /// The rejected token
    pub token: ReservationToken,
    /// Reservations removed
    pub removed: u64,
}

/// `POST /api/allocations/{id}/reserve`
///
/// The caller's `X-Session-Id` is stored so only the same session can
/// finalize.
///
/// # Errors
///
/// 404 for unknown allocations, 400 for quotas or ranges that do not fit.
pub async fn reserve(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    Path(id): Path<Uuid>,
    Json(request): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<ReservationReceipt>), AppError> {
    let receipt = state
        .reservations
        .reserve(AllocationId::from_uuid(id), request, session)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `POST /api/reservations/{token}/finalize`
///
/// # Errors
///
/// 404 for unknown tokens, 403 for foreign sessions or repeated finalization.
pub async fn finalize_reservation(
    State(state): State<AppState>,
    Viewer(identity): Viewer,
    SessionId(session): SessionId,
    Path(token): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state
        .reservations
        .finalize(
            ReservationToken::from_uuid(token),
            &identity,
            session.as_deref(),
        )
        .await?;
    record_ticket_opened(&ticket.handler_code);

    Ok(Json(ticket))
}

/// `POST|GET /api/reservations/{token}/accept`
///
/// # Errors
///
/// 401 for anonymous callers, 404 for unknown tokens.
pub async fn accept_reservation(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(token): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let reservations = state
        .reservations
        .accept(ReservationToken::from_uuid(token), &identity)
        .await?;
    record_reservation_decision("accepted");

    Ok(respond(reservations, return_to, &links))
}

/// `GET /api/reservations/{token}/reject`
///
/// The ticket stays and reports its reservation as deleted.
///
/// # Errors
///
/// 401 for anonymous callers, 404 for unknown tokens.
pub async fn reject_reservation(
    State(state): State<AppState>,
    RequireStaff(identity): RequireStaff,
    links: RequestLinks,
    Path(token): Path<Uuid>,
    Query(return_to): Query<ReturnTo>,
) -> Result<Response, AppError> {
    let token = ReservationToken::from_uuid(token);
    let removed = state.reservations.reject(token, &identity).await?;
    record_reservation_decision("rejected");

    Ok(respond(Rejected { token, removed }, return_to, &links))
}
