//! Ticket handlers.
//!
//! A handler is built per request from a ticket's `(handler_code,
//! handler_id)` pair. It wraps whatever the id points at and exposes the
//! uniform accessors tickets are displayed with. Nothing here is persisted.
//!
//! A lookup that finds nothing yields a handler with `is_deleted() == true`;
//! its accessors fall back to empty values.

pub mod event;
pub mod form;
pub mod registry;
pub mod reservation;

pub use event::EventHandler;
pub use form::FormHandler;
pub use registry::{
    EVENT_CODE, FORM_CODE, HandlerKind, HandlerRegistry, RESERVATION_CODE, registry,
};
pub use reservation::ReservationHandler;

use crate::collections::Collections;
use crate::error::{HandlerError, StoreError};
use crate::links::Action;
use crate::render::{Markup, RenderContext};

/// Capabilities every handler variant provides.
pub trait TicketHandler {
    /// Whether the underlying object is gone
    fn is_deleted(&self) -> bool;

    /// Contact address, empty for anonymous workflows
    fn email(&self) -> &str;

    /// Ticket title.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnsupportedResourceType`] for reservations of
    /// resources that cannot be titled.
    fn title(&self) -> Result<String, HandlerError>;

    /// Ticket group
    fn group(&self) -> &str;

    /// HTML summary, or a fixed notice when deleted.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Render`] if the macro renderer fails.
    fn render_summary(&self, ctx: &RenderContext<'_>) -> Result<Markup, HandlerError>;

    /// Workflow actions, computed from the loaded object on every call.
    fn list_actions(&self, ctx: &RenderContext<'_>) -> Vec<Action>;
}

/// The closed set of handler variants.
#[derive(Clone, Debug)]
pub enum Handler {
    /// `FRM`
    Form(FormHandler),
    /// `RSV`
    Reservation(ReservationHandler),
    /// `EVN`
    Event(EventHandler),
}

impl Handler {
    /// Resolves `code` through the registry and loads the matching variant.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnknownHandlerType`] for unregistered codes and
    /// [`HandlerError::Store`] if a lookup fails.
    pub async fn load(
        code: &str,
        handler_id: &str,
        collections: &Collections,
    ) -> Result<Self, HandlerError> {
        match registry().resolve(code)? {
            HandlerKind::Form => Ok(Self::Form(FormHandler::load(handler_id, collections).await?)),
            HandlerKind::Reservation => Ok(Self::Reservation(
                ReservationHandler::load(handler_id, collections).await?,
            )),
            HandlerKind::Event => {
                Ok(Self::Event(EventHandler::load(handler_id, collections).await?))
            }
        }
    }

    /// Checks whether the object behind `handler_id` is gone without
    /// building a full handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn is_missing(
        kind: HandlerKind,
        handler_id: &str,
        collections: &Collections,
    ) -> Result<bool, StoreError> {
        match kind {
            HandlerKind::Form => FormHandler::is_missing(handler_id, collections).await,
            HandlerKind::Reservation => {
                ReservationHandler::is_missing(handler_id, collections).await
            }
            HandlerKind::Event => EventHandler::is_missing(handler_id, collections).await,
        }
    }

    fn inner(&self) -> &dyn TicketHandler {
        match self {
            Self::Form(handler) => handler,
            Self::Reservation(handler) => handler,
            Self::Event(handler) => handler,
        }
    }
}

impl TicketHandler for Handler {
    fn is_deleted(&self) -> bool {
        self.inner().is_deleted()
    }

    fn email(&self) -> &str {
        self.inner().email()
    }

    fn title(&self) -> Result<String, HandlerError> {
        self.inner().title()
    }

    fn group(&self) -> &str {
        self.inner().group()
    }

    fn render_summary(&self, ctx: &RenderContext<'_>) -> Result<Markup, HandlerError> {
        self.inner().render_summary(ctx)
    }

    fn list_actions(&self, ctx: &RenderContext<'_>) -> Vec<Action> {
        self.inner().list_actions(ctx)
    }
}
