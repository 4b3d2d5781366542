//! Handler for event submission tickets (`EVN`).

use super::{EVENT_CODE, TicketHandler};
use crate::collections::Collections;
use crate::deletion::{Deletability, deletability};
use crate::error::{HandlerError, StoreError};
use crate::links::{Action, DeleteLink, Link, LinkTarget, RequestMethod, with_query};
use crate::models::{Event, EventState};
use crate::render::{Markup, RenderContext};
use crate::types::EventId;
use serde_json::json;

/// Shown instead of the summary once the event is gone
pub const DELETED_NOTICE: &str = "The event has been deleted.";

/// Confirmation text of the disabled delete action
pub const DELETE_BLOCKED_CONFIRM: &str = "This event can't be deleted.";

/// Explanation attached to the disabled delete action
pub const DELETE_BLOCKED_NOTICE: &str = "There is an existing ticket associated with this event.";

/// Group of every event ticket
pub const GROUP: &str = "Event";

/// A ticket backed by a submitted event.
#[derive(Clone, Debug)]
pub struct EventHandler {
    event: Option<Event>,
    deletable: Deletability,
}

impl EventHandler {
    /// Wraps an already loaded event and its deletion eligibility.
    #[must_use]
    pub const fn new(event: Option<Event>, deletable: Deletability) -> Self {
        Self { event, deletable }
    }

    /// Loads the event and re-derives whether it may be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Store`] if a lookup fails.
    #[tracing::instrument(skip(collections))]
    pub async fn load(handler_id: &str, collections: &Collections) -> Result<Self, HandlerError> {
        let Some(id) = EventId::parse_handler_id(handler_id) else {
            return Ok(Self::new(None, Deletability::Deletable));
        };

        let event = collections.events.event(id).await?;
        let deletable = deletability(EVENT_CODE, handler_id, collections).await?;
        Ok(Self::new(event, deletable))
    }

    /// Whether the event behind `handler_id` no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn is_missing(
        handler_id: &str,
        collections: &Collections,
    ) -> Result<bool, StoreError> {
        match EventId::parse_handler_id(handler_id) {
            Some(id) => Ok(collections.events.event(id).await?.is_none()),
            None => Ok(true),
        }
    }

    /// The wrapped event
    #[must_use]
    pub const fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }
}

impl TicketHandler for EventHandler {
    fn is_deleted(&self) -> bool {
        self.event.is_none()
    }

    fn email(&self) -> &str {
        ""
    }

    fn title(&self) -> Result<String, HandlerError> {
        Ok(self
            .event
            .as_ref()
            .map(|event| event.title.clone())
            .unwrap_or_default())
    }

    fn group(&self) -> &str {
        GROUP
    }

    fn render_summary(&self, ctx: &RenderContext<'_>) -> Result<Markup, HandlerError> {
        let Some(event) = &self.event else {
            return Ok(Markup::new(DELETED_NOTICE));
        };

        Ok(ctx
            .renderer
            .render_macro("display_event", &json!({ "event": event }))?)
    }

    fn list_actions(&self, ctx: &RenderContext<'_>) -> Vec<Action> {
        let Some(event) = &self.event else {
            return Vec::new();
        };

        let target = LinkTarget::Event(event.id);
        let ticket_url = ctx.links.link(LinkTarget::Ticket(ctx.ticket.id), None);
        let mut actions = Vec::with_capacity(3);

        match event.state {
            EventState::Submitted | EventState::Withdrawn => {
                let url = with_query(
                    &ctx.links.link(target, Some("publish")),
                    &[("return-to", &ticket_url)],
                );
                actions.push(Action::Link(Link::new("Publish event", url, "event-publish")));
            }
            EventState::Published => {
                let url = with_query(
                    &ctx.links.link(target, Some("withdraw")),
                    &[("return-to", &ticket_url)],
                );
                actions.push(Action::Link(Link::new("Withdraw event", url, "event-withdraw")));
            }
            EventState::Initiated => {}
        }

        let edit = with_query(
            &ctx.links.link(target, None),
            &[("edit", ""), ("return-to", &ctx.links.current_url())],
        );
        actions.push(Action::Link(Link::new("Edit event", edit, "edit-link")));

        let blocked = !self.deletable.is_deletable();
        actions.push(Action::Delete(DeleteLink {
            text: "Delete event".to_string(),
            url: ctx.links.link(target, None),
            confirm: if blocked {
                DELETE_BLOCKED_CONFIRM.to_string()
            } else {
                "Do you really want to delete this event?".to_string()
            },
            extra_information: blocked.then(|| DELETE_BLOCKED_NOTICE.to_string()),
            yes_button_text: (!blocked).then(|| "Delete event".to_string()),
            request_method: RequestMethod::Delete,
            redirect_after: Some(ticket_url),
        }));

        actions
    }
}
