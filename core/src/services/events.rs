//! Event workflow: submit (opens the ticket), publish, withdraw, edit,
//! delete.

use super::{ServiceError, TicketService, require_staff};
use crate::deletion::{Deletability, deletability};
use crate::handlers::EVENT_CODE;
use crate::lifecycle::{EventAction, EventLifecycle, EventReducer};
use crate::models::{Event, EventState};
use crate::reducer::{Effect, Reducer};
use crate::ticket::Ticket;
use crate::types::{EventId, Identity};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// A citizen's event submission.
#[derive(Clone, Debug, Deserialize)]
pub struct NewEvent {
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Location
    #[serde(default)]
    pub location: String,
    /// Start (local time)
    pub start: NaiveDateTime,
    /// End (local time)
    pub end: NaiveDateTime,
    /// Contact address of the submitter
    pub submitter_email: Option<String>,
}

/// Staff edits to an event. Absent fields are kept.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventUpdate {
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Location
    pub location: Option<String>,
    /// Start (local time)
    pub start: Option<NaiveDateTime>,
    /// End (local time)
    pub end: Option<NaiveDateTime>,
}

fn validate(event: &Event) -> Result<(), ServiceError> {
    if event.title.trim().is_empty() {
        return Err(ServiceError::Invalid("events need a title".into()));
    }
    if event.end < event.start {
        return Err(ServiceError::Invalid("events cannot end before they start".into()));
    }
    Ok(())
}

/// Event service
#[derive(Clone)]
pub struct EventService {
    tickets: TicketService,
    reducer: EventReducer,
}

impl EventService {
    /// Create a new event service
    #[must_use]
    pub const fn new(tickets: TicketService) -> Self {
        Self {
            tickets,
            reducer: EventReducer::new(),
        }
    }

    /// Event by id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such event.
    pub async fn event(&self, id: EventId) -> Result<Event, ServiceError> {
        self.tickets
            .collections()
            .events
            .event(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("event {id}")))
    }

    /// Event plus whether it may currently be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such event.
    pub async fn detail(&self, id: EventId) -> Result<(Event, Deletability), ServiceError> {
        let event = self.event(id).await?;
        let deletable = deletability(EVENT_CODE, &id.handler_id(), self.tickets.collections()).await?;
        Ok((event, deletable))
    }

    async fn apply(&self, event: Event, action: EventAction) -> Result<Event, ServiceError> {
        let mut state = EventLifecycle::new(event);
        let effects = self.reducer.reduce(&mut state, action, &());

        if let Some(error) = state.last_error {
            return Err(error.into());
        }

        for Effect::Persist(event) in effects {
            self.tickets.collections().events.update_event(&event).await?;
        }

        Ok(state.event)
    }

    /// Stores a submitted event and opens its ticket.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Invalid`] for an empty title or a negative duration
    /// - [`ServiceError::Handler`] if no ticket can be built; the event is
    ///   removed again
    /// - [`ServiceError::Store`] if storing fails
    #[tracing::instrument(skip(self, new_event), fields(title = %new_event.title))]
    pub async fn submit(&self, new_event: NewEvent) -> Result<(Event, Ticket), ServiceError> {
        let event = Event {
            id: EventId::new(),
            title: new_event.title,
            description: new_event.description,
            location: new_event.location,
            start: new_event.start,
            end: new_event.end,
            state: EventState::Initiated,
            submitter_email: new_event.submitter_email,
        };
        validate(&event)?;

        let collections = self.tickets.collections();
        collections.events.insert_event(&event).await?;

        let ticket = match self.tickets.prepare(EVENT_CODE, &event.id.handler_id()).await {
            Ok(ticket) => ticket,
            Err(error) => {
                collections.events.remove_event(event.id).await?;
                return Err(error);
            }
        };

        let event = self.apply(event, EventAction::Submit).await?;
        self.tickets.commit(&ticket).await?;

        Ok((event, ticket))
    }

    /// Publishes a submitted or withdrawn event.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such event
    /// - [`ServiceError::Transition`] if the actor or state does not allow it
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, id: EventId, actor: Identity) -> Result<Event, ServiceError> {
        let event = self.event(id).await?;
        self.apply(event, EventAction::Publish { actor }).await
    }

    /// Withdraws a published event.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such event
    /// - [`ServiceError::Transition`] if the actor or state does not allow it
    #[tracing::instrument(skip(self))]
    pub async fn withdraw(&self, id: EventId, actor: Identity) -> Result<Event, ServiceError> {
        let event = self.event(id).await?;
        self.apply(event, EventAction::Withdraw { actor }).await
    }

    /// Applies staff edits to an event.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Forbidden`] for anonymous callers
    /// - [`ServiceError::NotFound`] if there is no such event
    /// - [`ServiceError::Invalid`] if the result would be invalid
    #[tracing::instrument(skip(self, update))]
    pub async fn edit(
        &self,
        id: EventId,
        identity: &Identity,
        update: EventUpdate,
    ) -> Result<Event, ServiceError> {
        require_staff(identity, "edit events")?;
        let mut event = self.event(id).await?;

        if let Some(title) = update.title {
            event.title = title;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(location) = update.location {
            event.location = location;
        }
        if let Some(start) = update.start {
            event.start = start;
        }
        if let Some(end) = update.end {
            event.end = end;
        }
        validate(&event)?;

        self.tickets.collections().events.update_event(&event).await?;
        Ok(event)
    }

    /// Deletes an event no live ticket references.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Forbidden`] for anonymous callers
    /// - [`ServiceError::NotFound`] if there is no such event
    /// - [`ServiceError::DeletionBlocked`] if a live ticket references it
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: EventId, identity: &Identity) -> Result<(), ServiceError> {
        require_staff(identity, "delete events")?;
        let (_, deletable) = self.detail(id).await?;

        if let Deletability::Blocked { number, .. } = deletable {
            return Err(ServiceError::DeletionBlocked { number });
        }

        self.tickets.collections().events.remove_event(id).await?;
        tracing::info!(%id, "Event deleted");
        Ok(())
    }
}
