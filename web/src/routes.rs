//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::{events, health_check, readiness_check, reservations, submissions, tickets};
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderName,
    routing::{get, post, put},
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Header carrying the request id, generated when the client sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the complete Axum router.
///
/// Action links rendered into ticket details are plain links, so the
/// transition endpoints answer `GET` as well as `POST`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Tickets
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/:id", get(tickets::ticket_detail))
        .route(
            "/tickets/:id/accept",
            post(tickets::accept_ticket).get(tickets::accept_ticket),
        )
        .route(
            "/tickets/:id/close",
            post(tickets::close_ticket).get(tickets::close_ticket),
        )
        .route(
            "/tickets/:id/reopen",
            post(tickets::reopen_ticket).get(tickets::reopen_ticket),
        )
        // Forms
        .route("/forms/:name/submissions", post(submissions::submit_form))
        .route("/submissions/:id", put(submissions::edit_submission))
        .route(
            "/submissions/:id/complete",
            post(submissions::complete_submission),
        )
        // Reservations
        .route("/allocations/:id/reserve", post(reservations::reserve))
        .route(
            "/reservations/:token/finalize",
            post(reservations::finalize_reservation),
        )
        .route(
            "/reservations/:token/accept",
            post(reservations::accept_reservation).get(reservations::accept_reservation),
        )
        .route(
            "/reservations/:token/reject",
            get(reservations::reject_reservation),
        )
        // Events
        .route("/events", post(events::submit_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::edit_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/publish",
            post(events::publish_event).get(events::publish_event),
        )
        .route(
            "/events/:id/withdraw",
            post(events::withdraw_event).get(events::withdraw_event),
        );

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
