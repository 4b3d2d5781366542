//! State machines for tickets and events.
//!
//! Both follow the same pattern: commands are validated against the current
//! state, turned into events, applied, and a [`crate::reducer::Effect::Persist`]
//! is returned. Rejected commands record `last_error` and return no effects.

pub mod event;
pub mod ticket;

pub use event::{EventAction, EventLifecycle, EventReducer};
pub use ticket::{TicketAction, TicketEnvironment, TicketLifecycle, TicketReducer};
