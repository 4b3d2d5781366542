//! Lookup traits over the collections that own tickets and the records
//! tickets point at.
//!
//! A lookup returning `Ok(None)` (or an empty list) is the normal "deleted"
//! case and must not be treated as an error.

use crate::error::StoreError;
use crate::models::{Allocation, Event, FormDefinition, FormSubmission, Reservation, Resource};
use crate::ticket::{Ticket, TicketState};
use crate::types::{AllocationId, EventId, ReservationToken, ResourceId, SubmissionId, TicketId};
use async_trait::async_trait;
use std::sync::Arc;

/// Result alias for collection operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persisted tickets.
#[async_trait]
pub trait TicketCollection: Send + Sync {
    /// Ticket by id
    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// The ticket referencing the object `handler_id` of handler type `code`,
    /// if any
    async fn ticket_by_handler(&self, code: &str, handler_id: &str) -> Result<Option<Ticket>>;

    /// Whether a ticket number is already taken
    async fn ticket_number_exists(&self, number: &str) -> Result<bool>;

    /// All tickets, newest first, optionally filtered by state
    async fn tickets(&self, state: Option<TicketState>) -> Result<Vec<Ticket>>;

    /// Stores a new ticket
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Overwrites an existing ticket
    async fn update_ticket(&self, ticket: &Ticket) -> Result<()>;
}

/// Form definitions.
#[async_trait]
pub trait FormCollection: Send + Sync {
    /// Definition by name
    async fn form(&self, name: &str) -> Result<Option<FormDefinition>>;

    /// Stores or replaces a definition
    async fn insert_form(&self, form: &FormDefinition) -> Result<()>;
}

/// Form submissions.
#[async_trait]
pub trait SubmissionCollection: Send + Sync {
    /// Submission by id
    async fn submission(&self, id: SubmissionId) -> Result<Option<FormSubmission>>;

    /// Stores a new submission
    async fn insert_submission(&self, submission: &FormSubmission) -> Result<()>;

    /// Overwrites an existing submission
    async fn update_submission(&self, submission: &FormSubmission) -> Result<()>;

    /// Deletes a submission, returning whether it existed
    async fn remove_submission(&self, id: SubmissionId) -> Result<bool>;
}

/// Bookable resources and their allocations.
#[async_trait]
pub trait ResourceCollection: Send + Sync {
    /// Resource by id
    async fn resource(&self, id: ResourceId) -> Result<Option<Resource>>;

    /// Allocation by id
    async fn allocation(&self, id: AllocationId) -> Result<Option<Allocation>>;

    /// Stores or replaces a resource
    async fn insert_resource(&self, resource: &Resource) -> Result<()>;

    /// Stores or replaces an allocation
    async fn insert_allocation(&self, allocation: &Allocation) -> Result<()>;
}

/// Reservations, grouped by token.
#[async_trait]
pub trait ReservationCollection: Send + Sync {
    /// All reservations sharing a token, in reservation order
    async fn reservations_by_token(&self, token: ReservationToken) -> Result<Vec<Reservation>>;

    /// Stores a new reservation
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()>;

    /// Marks all reservations of a token approved, returning how many changed
    async fn approve_reservations(&self, token: ReservationToken) -> Result<u64>;

    /// Marks all reservations of a token accepted by staff
    async fn accept_reservations(&self, token: ReservationToken) -> Result<u64>;

    /// Deletes all reservations of a token
    async fn remove_reservations(&self, token: ReservationToken) -> Result<u64>;
}

/// Submitted events.
#[async_trait]
pub trait EventCollection: Send + Sync {
    /// Event by id
    async fn event(&self, id: EventId) -> Result<Option<Event>>;

    /// Stores a new event
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Overwrites an existing event
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Deletes an event, returning whether it existed
    async fn remove_event(&self, id: EventId) -> Result<bool>;
}

/// Every collection a handler or service may need.
#[derive(Clone)]
pub struct Collections {
    /// Tickets
    pub tickets: Arc<dyn TicketCollection>,
    /// Form definitions
    pub forms: Arc<dyn FormCollection>,
    /// Form submissions
    pub submissions: Arc<dyn SubmissionCollection>,
    /// Resources and allocations
    pub resources: Arc<dyn ResourceCollection>,
    /// Reservations
    pub reservations: Arc<dyn ReservationCollection>,
    /// Events
    pub events: Arc<dyn EventCollection>,
}

impl Collections {
    /// Uses one store for every collection.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: TicketCollection
            + FormCollection
            + SubmissionCollection
            + ResourceCollection
            + ReservationCollection
            + EventCollection
            + 'static,
    {
        Self {
            tickets: store.clone(),
            forms: store.clone(),
            submissions: store.clone(),
            resources: store.clone(),
            reservations: store.clone(),
            events: store,
        }
    }
}
