//! Computes the actions shown on a ticket.
//!
//! Handler actions are only offered while a ticket is pending. Every ticket
//! ends with the link of its next state transition. Anonymous viewers get
//! nothing.

use crate::handlers::TicketHandler;
use crate::links::{Action, Link, LinkTarget};
use crate::render::RenderContext;
use crate::ticket::TicketState;

/// The transition link for a ticket state.
#[must_use]
pub fn transition_link(state: TicketState, ctx: &RenderContext<'_>) -> Link {
    let (text, view, class) = match state {
        TicketState::Open => ("Accept ticket", "accept", "ticket-accept"),
        TicketState::Pending => ("Close ticket", "close", "ticket-close"),
        TicketState::Closed => ("Reopen ticket", "reopen", "ticket-reopen"),
    };

    Link::new(
        text,
        ctx.links.link(LinkTarget::Ticket(ctx.ticket.id), Some(view)),
        class,
    )
}

/// All actions of `ctx.ticket` for the viewer in `ctx`.
pub fn ticket_actions(handler: &dyn TicketHandler, ctx: &RenderContext<'_>) -> Vec<Action> {
    if !ctx.identity.is_staff() {
        return Vec::new();
    }

    let mut actions = if ctx.ticket.state == TicketState::Pending {
        handler.list_actions(ctx)
    } else {
        Vec::new()
    };

    actions.push(Action::Link(transition_link(ctx.ticket.state, ctx)));
    actions
}
