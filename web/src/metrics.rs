//! Business metrics for Town.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `town_tickets_opened_total{code}` - Tickets opened per handler code
//! - `town_ticket_transitions_total{action}` - Accepted, closed and reopened tickets
//! - `town_reservation_decisions_total{decision}` - Accepted and rejected reservations
//! - `town_events_total{action}` - Event publications, withdrawals and deletions

use metrics::describe_counter;

/// Register descriptions for all business metrics.
///
/// Call once at startup, before any metric is recorded.
pub fn register_town_metrics() {
    describe_counter!(
        "town_tickets_opened_total",
        "Total number of tickets opened, by handler code (FRM, RSV, EVN)"
    );
    describe_counter!(
        "town_ticket_transitions_total",
        "Total number of ticket transitions, by action (accept, close, reopen)"
    );
    describe_counter!(
        "town_reservation_decisions_total",
        "Total number of staff decisions on reservations (accepted, rejected)"
    );
    describe_counter!(
        "town_events_total",
        "Total number of staff actions on events (published, withdrawn, deleted)"
    );

    tracing::info!("Town metrics registered");
}

/// Record a newly opened ticket.
pub fn record_ticket_opened(code: &str) {
    metrics::counter!("town_tickets_opened_total", "code" => code.to_string()).increment(1);
}

/// Record a ticket transition (`"accept"`, `"close"`, `"reopen"`).
pub fn record_ticket_transition(action: &'static str) {
    metrics::counter!("town_ticket_transitions_total", "action" => action).increment(1);
}

/// Record a staff decision on a reservation (`"accepted"`, `"rejected"`).
pub fn record_reservation_decision(decision: &'static str) {
    metrics::counter!("town_reservation_decisions_total", "decision" => decision).increment(1);
}

/// Record a staff action on an event (`"published"`, `"withdrawn"`, `"deleted"`).
pub fn record_event_action(action: &'static str) {
    metrics::counter!("town_events_total", "action" => action).increment(1);
}
