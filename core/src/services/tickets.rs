//! Opening, transitioning and displaying tickets.

use super::ServiceError;
use crate::collections::Collections;
use crate::handlers::{Handler, TicketHandler, registry};
use crate::lifecycle::{TicketAction, TicketEnvironment, TicketLifecycle, TicketReducer};
use crate::links::{Action, LinkBuilder};
use crate::reducer::{Clock, Effect, Reducer};
use crate::render::{MacroRenderer, Markup, RenderContext};
use crate::resolver::ticket_actions;
use crate::ticket::{MAX_NUMBER_ATTEMPTS, Ticket, TicketState, generate_ticket_number};
use crate::types::{Identity, TicketId};
use serde::Serialize;
use std::sync::Arc;

/// Everything shown on a ticket page.
#[derive(Clone, Debug, Serialize)]
pub struct TicketDetail {
    /// The stored ticket
    pub ticket: Ticket,
    /// Live title from the handler
    pub title: String,
    /// Live group from the handler
    pub group: String,
    /// Contact address
    pub email: String,
    /// Whether the underlying object is gone
    pub deleted: bool,
    /// Rendered summary
    pub summary: Markup,
    /// Actions for the viewer
    pub actions: Vec<Action>,
}

/// Ticket service
#[derive(Clone)]
pub struct TicketService {
    collections: Collections,
    reducer: TicketReducer,
    env: TicketEnvironment,
}

impl TicketService {
    /// Create a new ticket service
    #[must_use]
    pub fn new(collections: Collections, clock: Arc<dyn Clock>) -> Self {
        Self {
            collections,
            reducer: TicketReducer::new(),
            env: TicketEnvironment::new(clock),
        }
    }

    /// The collections this service works on
    #[must_use]
    pub const fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Draws ticket numbers until one is not taken.
    async fn issue_number(&self, code: &str) -> Result<String, ServiceError> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let number = {
                let mut rng = rand::thread_rng();
                generate_ticket_number(code, &mut rng)
            };
            if !self.collections.tickets.ticket_number_exists(&number).await? {
                return Ok(number);
            }
        }

        Err(ServiceError::Conflict(format!(
            "no free ticket number for {code} after {MAX_NUMBER_ATTEMPTS} attempts"
        )))
    }

    /// Opens a ticket for the object behind `(code, handler_id)`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Handler`] for unknown codes or failing lookups
    /// - [`ServiceError::Conflict`] if a ticket already references the object
    /// - [`ServiceError::Store`] if the ticket cannot be stored
    #[tracing::instrument(skip(self))]
    pub async fn open(&self, code: &str, handler_id: &str) -> Result<Ticket, ServiceError> {
        let ticket = self.prepare(code, handler_id).await?;
        self.commit(&ticket).await?;
        Ok(ticket)
    }

    /// Builds the ticket [`open`](Self::open) would store, without storing
    /// it.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Handler`] for unknown codes, failing lookups or
    ///   objects without a title
    /// - [`ServiceError::Conflict`] if a ticket already references the object
    pub async fn prepare(&self, code: &str, handler_id: &str) -> Result<Ticket, ServiceError> {
        registry().resolve(code)?;

        if let Some(existing) = self
            .collections
            .tickets
            .ticket_by_handler(code, handler_id)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "ticket {} already references {code} {handler_id}",
                existing.number
            )));
        }

        let handler = Handler::load(code, handler_id, &self.collections).await?;
        let title = handler.title()?;
        let number = self.issue_number(code).await?;

        let mut ticket = Ticket::open(number, code, handler_id, self.env.clock.now());
        ticket.title = title;
        ticket.group = handler.group().to_string();
        Ok(ticket)
    }

    /// Stores a ticket built by [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the ticket cannot be stored.
    pub async fn commit(&self, ticket: &Ticket) -> Result<(), ServiceError> {
        self.collections.tickets.insert_ticket(ticket).await?;
        tracing::info!(number = %ticket.number, code = %ticket.handler_code, "Ticket opened");
        Ok(())
    }

    /// Ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such ticket.
    pub async fn ticket(&self, id: TicketId) -> Result<Ticket, ServiceError> {
        self.collections
            .tickets
            .ticket(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("ticket {id}")))
    }

    /// Tickets, optionally filtered by state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the lookup fails.
    pub async fn list(&self, state: Option<TicketState>) -> Result<Vec<Ticket>, ServiceError> {
        Ok(self.collections.tickets.tickets(state).await?)
    }

    /// Runs a lifecycle command against a ticket and persists the result.
    ///
    /// Title and group snapshots are refreshed from the handler while the
    /// underlying object still exists.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such ticket
    /// - [`ServiceError::Transition`] if the reducer refused the command
    /// - [`ServiceError::Handler`] / [`ServiceError::Store`] on lookup failures
    #[tracing::instrument(skip(self))]
    pub async fn transition(
        &self,
        id: TicketId,
        action: TicketAction,
    ) -> Result<Ticket, ServiceError> {
        let mut state = TicketLifecycle::new(self.ticket(id).await?);
        let effects = self.reducer.reduce(&mut state, action, &self.env);

        if let Some(error) = state.last_error {
            return Err(error.into());
        }

        for Effect::Persist(mut ticket) in effects {
            let handler =
                Handler::load(&ticket.handler_code, &ticket.handler_id, &self.collections).await?;
            if !handler.is_deleted() {
                ticket.title = handler.title()?;
                ticket.group = handler.group().to_string();
            }
            self.collections.tickets.update_ticket(&ticket).await?;
            tracing::info!(
                number = %ticket.number,
                state = %ticket.state,
                "Ticket transitioned"
            );
            state.ticket = ticket;
        }

        Ok(state.ticket)
    }

    /// Accepts an open ticket.
    ///
    /// # Errors
    ///
    /// See [`TicketService::transition`].
    pub async fn accept(&self, id: TicketId, actor: Identity) -> Result<Ticket, ServiceError> {
        self.transition(id, TicketAction::Accept { actor }).await
    }

    /// Closes a pending ticket.
    ///
    /// # Errors
    ///
    /// See [`TicketService::transition`].
    pub async fn close(&self, id: TicketId, actor: Identity) -> Result<Ticket, ServiceError> {
        self.transition(id, TicketAction::Close { actor }).await
    }

    /// Reopens a closed ticket. Open tickets are returned unchanged.
    ///
    /// # Errors
    ///
    /// See [`TicketService::transition`].
    pub async fn reopen(&self, id: TicketId, actor: Identity) -> Result<Ticket, ServiceError> {
        self.transition(id, TicketAction::Reopen { actor }).await
    }

    /// Builds the ticket page for `identity`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such ticket
    /// - [`ServiceError::Handler`] for unknown codes, unsupported resource
    ///   types or render failures
    #[tracing::instrument(skip(self, links, renderer))]
    pub async fn detail(
        &self,
        id: TicketId,
        identity: &Identity,
        links: &dyn LinkBuilder,
        renderer: &dyn MacroRenderer,
    ) -> Result<TicketDetail, ServiceError> {
        let ticket = self.ticket(id).await?;
        let handler =
            Handler::load(&ticket.handler_code, &ticket.handler_id, &self.collections).await?;

        let ctx = RenderContext {
            identity,
            links,
            renderer,
            ticket: &ticket,
        };

        let summary = handler.render_summary(&ctx)?;
        let actions = ticket_actions(&handler, &ctx);
        let deleted = handler.is_deleted();
        let (title, group) = if deleted {
            (ticket.title.clone(), ticket.group.clone())
        } else {
            (handler.title()?, handler.group().to_string())
        };

        Ok(TicketDetail {
            title,
            group,
            email: handler.email().to_string(),
            deleted,
            summary,
            actions,
            ticket,
        })
    }
}
