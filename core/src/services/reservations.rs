//! Reservation workflow: reserve, finalize (opens the ticket), accept,
//! reject.
//!
//! The booking scheduler is reduced to quota and range checks against the
//! allocation. Contention between concurrent bookings is not handled.

use super::{ServiceError, TicketService, require_staff};
use crate::handlers::RESERVATION_CODE;
use crate::handlers::reservation::submission_id_for;
use crate::models::{FormSubmission, Reservation, ReservationStatus, SubmissionState};
use crate::ticket::Ticket;
use crate::types::{AllocationId, Identity, ReservationId, ReservationToken};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A booking request for one allocation.
#[derive(Clone, Debug, Deserialize)]
pub struct ReservationRequest {
    /// Contact address
    pub email: String,
    /// Spots to reserve
    #[serde(default = "default_quota")]
    pub quota: u32,
    /// Start within a partly available allocation
    pub start: Option<NaiveDateTime>,
    /// End within a partly available allocation
    pub end: Option<NaiveDateTime>,
}

const fn default_quota() -> u32 {
    1
}

/// Result of a successful reservation.
#[derive(Clone, Debug, Serialize)]
pub struct ReservationReceipt {
    /// Token to finalize the booking with
    pub token: ReservationToken,
    /// The stored reservation
    pub reservation: Reservation,
    /// Whether extra data must be entered before finalizing
    pub needs_details: bool,
}

/// Reservation service
#[derive(Clone)]
pub struct ReservationService {
    tickets: TicketService,
}

impl ReservationService {
    /// Create a new reservation service
    #[must_use]
    pub const fn new(tickets: TicketService) -> Self {
        Self { tickets }
    }

    async fn load(&self, token: ReservationToken) -> Result<Vec<Reservation>, ServiceError> {
        let reservations = self
            .tickets
            .collections()
            .reservations
            .reservations_by_token(token)
            .await?;

        if reservations.is_empty() {
            return Err(ServiceError::NotFound(format!("reservation {token}")));
        }
        Ok(reservations)
    }

    /// Reserves an allocation for the browser session `session_id`.
    ///
    /// If the resource collects extra data, an empty pending submission
    /// keyed by the token is created alongside.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the allocation or resource is missing
    /// - [`ServiceError::Invalid`] for resources of an unknown type, and for
    ///   quotas or ranges the allocation cannot hold
    #[tracing::instrument(skip(self, request))]
    pub async fn reserve(
        &self,
        allocation_id: AllocationId,
        request: ReservationRequest,
        session_id: Option<String>,
    ) -> Result<ReservationReceipt, ServiceError> {
        let collections = self.tickets.collections();
        let allocation = collections
            .resources
            .allocation(allocation_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("allocation {allocation_id}")))?;
        let resource = collections
            .resources
            .resource(allocation.resource)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("resource {}", allocation.resource)))?;

        if !resource.resource_type.is_bookable() {
            return Err(ServiceError::Invalid(format!(
                "resource {} of type {} cannot be reserved",
                resource.name,
                resource.resource_type.as_str()
            )));
        }
        if request.email.trim().is_empty() {
            return Err(ServiceError::Invalid("an e-mail address is required".into()));
        }
        if request.quota == 0 || request.quota > allocation.quota {
            return Err(ServiceError::Invalid(format!(
                "quota must be between 1 and {}",
                allocation.quota
            )));
        }

        let (start, end) = match (allocation.partly_available, request.start, request.end) {
            (true, Some(start), Some(end)) => {
                if start >= end || start < allocation.start || end > allocation.end {
                    return Err(ServiceError::Invalid(
                        "requested range lies outside the allocation".into(),
                    ));
                }
                (start, end)
            }
            _ => (allocation.start, allocation.end),
        };

        let token = ReservationToken::new();
        let reservation = Reservation {
            id: ReservationId::new(),
            token,
            resource: resource.id,
            email: request.email.clone(),
            start,
            end,
            quota: request.quota,
            status: ReservationStatus::Pending,
            accepted: false,
            session_id,
        };
        collections.reservations.insert_reservation(&reservation).await?;

        let needs_details = if let Some(definition) = &resource.definition {
            let mut submission =
                FormSubmission::pending(definition, &resource.title, &request.email, Vec::new());
            submission.id = submission_id_for(token);
            submission.reservation = Some(token);
            collections.submissions.insert_submission(&submission).await?;
            true
        } else {
            false
        };

        tracing::info!(%token, resource = %resource.name, "Reservation stored");

        Ok(ReservationReceipt {
            token,
            reservation,
            needs_details,
        })
    }

    /// Approves the reservations of a token and opens their ticket.
    ///
    /// Anonymous callers must come from the session that reserved and may
    /// only finalize once.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if no reservation has this token
    /// - [`ServiceError::Forbidden`] for foreign sessions or repeated finalization
    /// - [`ServiceError::Handler`] if no ticket can be built for the
    ///   reservation; nothing is approved then
    #[tracing::instrument(skip(self))]
    pub async fn finalize(
        &self,
        token: ReservationToken,
        identity: &Identity,
        session_id: Option<&str>,
    ) -> Result<Ticket, ServiceError> {
        let reservations = self.load(token).await?;

        if !identity.is_staff() {
            for reservation in &reservations {
                let same_session = reservation.session_id.is_some()
                    && reservation.session_id.as_deref() == session_id;
                if !same_session || reservation.status == ReservationStatus::Approved {
                    return Err(ServiceError::Forbidden(
                        "this reservation can no longer be changed".into(),
                    ));
                }
            }
        }

        let ticket = self
            .tickets
            .prepare(RESERVATION_CODE, &token.handler_id())
            .await?;

        let collections = self.tickets.collections();
        collections.reservations.approve_reservations(token).await?;

        if let Some(mut submission) = collections
            .submissions
            .submission(submission_id_for(token))
            .await?
        {
            submission.state = SubmissionState::Complete;
            collections.submissions.update_submission(&submission).await?;
        }

        self.tickets.commit(&ticket).await?;
        Ok(ticket)
    }

    /// Marks the reservations of a token as accepted by staff.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Forbidden`] for anonymous callers
    /// - [`ServiceError::NotFound`] if no reservation has this token
    #[tracing::instrument(skip(self))]
    pub async fn accept(
        &self,
        token: ReservationToken,
        identity: &Identity,
    ) -> Result<Vec<Reservation>, ServiceError> {
        require_staff(identity, "accept reservations")?;
        self.load(token).await?;

        let collections = self.tickets.collections();
        collections.reservations.accept_reservations(token).await?;
        tracing::info!(%token, "Reservation accepted");

        self.load(token).await
    }

    /// Removes the reservations of a token and their data submission.
    ///
    /// The ticket stays; its handler reports the reservation as deleted.
    /// Concurrent rejections are not coordinated.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Forbidden`] for anonymous callers
    /// - [`ServiceError::NotFound`] if no reservation has this token
    #[tracing::instrument(skip(self))]
    pub async fn reject(
        &self,
        token: ReservationToken,
        identity: &Identity,
    ) -> Result<u64, ServiceError> {
        require_staff(identity, "reject reservations")?;
        self.load(token).await?;

        let collections = self.tickets.collections();
        let removed = collections.reservations.remove_reservations(token).await?;
        collections
            .submissions
            .remove_submission(submission_id_for(token))
            .await?;
        tracing::info!(%token, removed, "Reservation rejected");

        Ok(removed)
    }
}
