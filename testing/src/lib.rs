//! # Town Testing
//!
//! Testing utilities for the Town workspace.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every collection trait backed by a `RwLock`ed map
//! - [`fixtures`]: builders for forms, resources, reservations, events, tickets
//! - [`mocks`]: fixed clock, static link builder, echoing and failing renderers
//! - [`ReducerTest`]: Given-When-Then harness for the lifecycle reducers
//!
//! ## Example
//!
//! ```ignore
//! use town_testing::{InMemoryStore, fixtures, test_clock};
//!
//! #[tokio::test]
//! async fn submitted_events_get_a_ticket() {
//!     let store = InMemoryStore::new();
//!     let tickets = TicketService::new(store.collections(), Arc::new(test_clock()));
//!     let events = EventService::new(tickets);
//!
//!     let (_, ticket) = events.submit(new_event()).await?;
//!     assert_eq!(ticket.handler_code, "EVN");
//! }
//! ```

pub mod fixtures;
pub mod memory_store;
pub mod mocks;

/// Installs a test subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "town=debug,town_core=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use memory_store::InMemoryStore;
pub use mocks::{EchoRenderer, FailingRenderer, FixedClock, StaticLinks, test_clock};
pub use reducer_test::{ReducerTest, assertions};
