//! In-memory implementation of every collection trait.
//!
//! Fast and deterministic; used by unit, integration and router tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Only panics on a poisoned lock

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use town_core::collections::{
    Collections, EventCollection, FormCollection, ReservationCollection, ResourceCollection,
    Result, SubmissionCollection, TicketCollection,
};
use town_core::error::StoreError;
use town_core::models::{
    Allocation, Event, FormDefinition, FormSubmission, Reservation, ReservationStatus, Resource,
};
use town_core::ticket::{Ticket, TicketState};
use town_core::types::{AllocationId, EventId, ReservationToken, ResourceId, SubmissionId, TicketId};

#[derive(Debug, Default)]
struct Data {
    tickets: Vec<Ticket>,
    forms: HashMap<String, FormDefinition>,
    submissions: HashMap<SubmissionId, FormSubmission>,
    resources: HashMap<ResourceId, Resource>,
    allocations: HashMap<AllocationId, Allocation>,
    reservations: Vec<Reservation>,
    events: HashMap<EventId, Event>,
}

/// In-memory store backing all collections.
///
/// # Example
///
/// ```ignore
/// use town_testing::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.insert_event(&event).await?;
/// let collections = store.collections();
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<Data>>,
}

impl InMemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collections backed by this store
    #[must_use]
    pub fn collections(&self) -> Collections {
        Collections::shared(Arc::new(self.clone()))
    }

    /// Number of stored tickets
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.data.read().unwrap().tickets.len()
    }

    /// Number of stored reservations across all tokens
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.data.read().unwrap().reservations.len()
    }
}

#[async_trait]
impl TicketCollection for InMemoryStore {
    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let data = self.data.read().unwrap();
        Ok(data.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn ticket_by_handler(&self, code: &str, handler_id: &str) -> Result<Option<Ticket>> {
        let data = self.data.read().unwrap();
        Ok(data
            .tickets
            .iter()
            .find(|t| t.handler_code == code && t.handler_id == handler_id)
            .cloned())
    }

    async fn ticket_number_exists(&self, number: &str) -> Result<bool> {
        let data = self.data.read().unwrap();
        Ok(data.tickets.iter().any(|t| t.number == number))
    }

    async fn tickets(&self, state: Option<TicketState>) -> Result<Vec<Ticket>> {
        let data = self.data.read().unwrap();
        let mut tickets: Vec<Ticket> = data
            .tickets
            .iter()
            .filter(|t| state.is_none_or(|state| t.state == state))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(tickets)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        let mut data = self.data.write().unwrap();
        if data.tickets.iter().any(|t| t.number == ticket.number) {
            return Err(StoreError::Conflict(format!(
                "ticket number {} is taken",
                ticket.number
            )));
        }
        data.tickets.push(ticket.clone());
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let stored = data
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket.id)
            .ok_or_else(|| StoreError::NotFound(format!("ticket {}", ticket.id)))?;
        *stored = ticket.clone();
        Ok(())
    }
}

#[async_trait]
impl FormCollection for InMemoryStore {
    async fn form(&self, name: &str) -> Result<Option<FormDefinition>> {
        Ok(self.data.read().unwrap().forms.get(name).cloned())
    }

    async fn insert_form(&self, form: &FormDefinition) -> Result<()> {
        self.data
            .write()
            .unwrap()
            .forms
            .insert(form.name.clone(), form.clone());
        Ok(())
    }
}

#[async_trait]
impl SubmissionCollection for InMemoryStore {
    async fn submission(&self, id: SubmissionId) -> Result<Option<FormSubmission>> {
        Ok(self.data.read().unwrap().submissions.get(&id).cloned())
    }

    async fn insert_submission(&self, submission: &FormSubmission) -> Result<()> {
        let mut data = self.data.write().unwrap();
        if data.submissions.contains_key(&submission.id) {
            return Err(StoreError::Conflict(format!("submission {}", submission.id)));
        }
        data.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn update_submission(&self, submission: &FormSubmission) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let stored = data
            .submissions
            .get_mut(&submission.id)
            .ok_or_else(|| StoreError::NotFound(format!("submission {}", submission.id)))?;
        *stored = submission.clone();
        Ok(())
    }

    async fn remove_submission(&self, id: SubmissionId) -> Result<bool> {
        Ok(self.data.write().unwrap().submissions.remove(&id).is_some())
    }
}

#[async_trait]
impl ResourceCollection for InMemoryStore {
    async fn resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        Ok(self.data.read().unwrap().resources.get(&id).cloned())
    }

    async fn allocation(&self, id: AllocationId) -> Result<Option<Allocation>> {
        Ok(self.data.read().unwrap().allocations.get(&id).cloned())
    }

    async fn insert_resource(&self, resource: &Resource) -> Result<()> {
        self.data
            .write()
            .unwrap()
            .resources
            .insert(resource.id, resource.clone());
        Ok(())
    }

    async fn insert_allocation(&self, allocation: &Allocation) -> Result<()> {
        self.data
            .write()
            .unwrap()
            .allocations
            .insert(allocation.id, allocation.clone());
        Ok(())
    }
}

#[async_trait]
impl ReservationCollection for InMemoryStore {
    async fn reservations_by_token(&self, token: ReservationToken) -> Result<Vec<Reservation>> {
        let data = self.data.read().unwrap();
        Ok(data
            .reservations
            .iter()
            .filter(|r| r.token == token)
            .cloned()
            .collect())
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()> {
        self.data
            .write()
            .unwrap()
            .reservations
            .push(reservation.clone());
        Ok(())
    }

    async fn approve_reservations(&self, token: ReservationToken) -> Result<u64> {
        let mut data = self.data.write().unwrap();
        let mut changed = 0;
        for reservation in data.reservations.iter_mut().filter(|r| r.token == token) {
            reservation.status = ReservationStatus::Approved;
            changed += 1;
        }
        Ok(changed)
    }

    async fn accept_reservations(&self, token: ReservationToken) -> Result<u64> {
        let mut data = self.data.write().unwrap();
        let mut changed = 0;
        for reservation in data.reservations.iter_mut().filter(|r| r.token == token) {
            reservation.accepted = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn remove_reservations(&self, token: ReservationToken) -> Result<u64> {
        let mut data = self.data.write().unwrap();
        let before = data.reservations.len();
        data.reservations.retain(|r| r.token != token);
        Ok((before - data.reservations.len()) as u64)
    }
}

#[async_trait]
impl EventCollection for InMemoryStore {
    async fn event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.data.read().unwrap().events.get(&id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut data = self.data.write().unwrap();
        if data.events.contains_key(&event.id) {
            return Err(StoreError::Conflict(format!("event {}", event.id)));
        }
        data.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let stored = data
            .events
            .get_mut(&event.id)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", event.id)))?;
        *stored = event.clone();
        Ok(())
    }

    async fn remove_event(&self, id: EventId) -> Result<bool> {
        Ok(self.data.write().unwrap().events.remove(&id).is_some())
    }
}
