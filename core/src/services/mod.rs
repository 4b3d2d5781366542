//! Services: load state from the collections, run the reducers, carry out
//! their effects.

pub mod events;
pub mod forms;
pub mod reservations;
pub mod tickets;

pub use events::{EventService, EventUpdate, NewEvent};
pub use forms::{FormService, SubmissionUpdate};
pub use reservations::{ReservationReceipt, ReservationRequest, ReservationService};
pub use tickets::{TicketDetail, TicketService};

use crate::error::{HandlerError, StoreError, TransitionError};
use crate::types::Identity;
use thiserror::Error;

/// Errors that can occur in services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The addressed record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The caller may not perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request is malformed
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// The operation conflicts with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deletion refused because a live ticket references the object
    #[error("Referenced by ticket {number}")]
    DeletionBlocked {
        /// Number of the referencing ticket
        number: String,
    },

    /// A lifecycle transition was refused
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Handler resolution or rendering failed
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// A collection operation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fails with [`ServiceError::Forbidden`] unless `identity` is staff.
pub(crate) fn require_staff(identity: &Identity, what: &str) -> Result<(), ServiceError> {
    if identity.is_staff() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("only staff may {what}")))
    }
}
