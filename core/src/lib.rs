//! # Town Core
//!
//! Tickets for the municipal website: citizens submit forms, book resources
//! and hand in events. Each of these workflows is reviewed by staff through a
//! ticket, and a per-type handler explains what the ticket is about.
//!
//! ## Core Concepts
//!
//! - **Ticket**: persisted record with a type code, an opaque handler id and
//!   a state (`open`, `pending`, `closed`)
//! - **Handler**: built per request from `(code, handler_id)`, wraps the
//!   underlying record and exposes title, group, e-mail, summary and actions
//! - **Registry**: maps type codes to handler kinds, initialised once
//! - **Reducers**: the ticket and event state machines, pure
//!   `(state, action, env) -> effects` functions
//! - **Collections**: async lookup traits, implemented by the Postgres store
//!   and by the in-memory store in `town-testing`
//!
//! ## Example
//!
//! ```ignore
//! use town_core::handlers::{Handler, TicketHandler};
//!
//! let handler = Handler::load(&ticket.handler_code, &ticket.handler_id, &collections).await?;
//! if handler.is_deleted() {
//!     println!("{} (deleted)", ticket.title);
//! } else {
//!     println!("{} / {}", handler.title()?, handler.group());
//! }
//! ```

pub mod collections;
pub mod deletion;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod links;
pub mod models;
pub mod reducer;
pub mod render;
pub mod resolver;
pub mod services;
pub mod ticket;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDateTime, Utc};
pub use collections::Collections;
pub use error::{HandlerError, RenderError, StoreError, TransitionError};
pub use handlers::{Handler, TicketHandler};
pub use reducer::{Clock, Effect, Reducer, SystemClock};
pub use smallvec::{SmallVec, smallvec};
pub use ticket::{Ticket, TicketState};
pub use types::Identity;
