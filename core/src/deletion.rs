//! Whether an object referenced by tickets may be deleted through the UI.
//!
//! An object is deletable iff no ticket references it, or the referencing
//! ticket's handler already reports the object as deleted. The answer is
//! derived from the collections on every call.

use crate::collections::Collections;
use crate::error::HandlerError;
use crate::handlers::{Handler, registry};
use crate::types::TicketId;
use serde::Serialize;

/// Outcome of [`deletability`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Deletability {
    /// Free to delete
    Deletable,
    /// A live ticket still references the object
    Blocked {
        /// The referencing ticket
        ticket: TicketId,
        /// Its display number
        number: String,
    },
}

impl Deletability {
    /// Whether deletion is allowed
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        matches!(self, Self::Deletable)
    }
}

/// Checks whether the object `handler_id` of handler type `code` may be
/// deleted.
///
/// # Errors
///
/// Returns [`HandlerError::UnknownHandlerType`] if `code` is not registered,
/// or [`HandlerError::Store`] if a lookup fails.
#[tracing::instrument(skip(collections))]
pub async fn deletability(
    code: &str,
    handler_id: &str,
    collections: &Collections,
) -> Result<Deletability, HandlerError> {
    let kind = registry().resolve(code)?;
    let Some(ticket) = collections.tickets.ticket_by_handler(code, handler_id).await? else {
        return Ok(Deletability::Deletable);
    };

    if Handler::is_missing(kind, handler_id, collections).await? {
        return Ok(Deletability::Deletable);
    }

    Ok(Deletability::Blocked {
        ticket: ticket.id,
        number: ticket.number,
    })
}
