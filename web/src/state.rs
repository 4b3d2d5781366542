//! Application state shared by all HTTP handlers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use town_core::Collections;
use town_core::reducer::Clock;
use town_core::render::MacroRenderer;
use town_core::services::{EventService, FormService, ReservationService, TicketService};
use town_core::types::Identity;

/// Checks whether the backing services can take traffic.
#[async_trait]
pub trait Readiness: Send + Sync {
    /// `Ok(())` when ready, otherwise a short reason
    async fn check(&self) -> Result<(), String>;
}

/// Readiness probe that always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

#[async_trait]
impl Readiness for AlwaysReady {
    async fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Maps staff tokens (sent in `X-Staff-Token`) to usernames.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    tokens: HashMap<String, String>,
}

impl StaffDirectory {
    /// Directory from `(token, username)` pairs
    pub fn new<I, T, U>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            tokens: entries
                .into_iter()
                .map(|(token, user)| (token.into(), user.into()))
                .collect(),
        }
    }

    /// The staff identity behind `token`, if it is known
    #[must_use]
    pub fn identify(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).map(Identity::staff)
    }

    /// Number of configured tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no staff token is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Application state shared across all HTTP handlers.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(
///     store.collections(),
///     Arc::new(SystemClock),
///     Arc::new(HandlebarsRenderer::new()?),
///     "https://town.example",
///     StaffDirectory::new([("secret", "editor")]),
/// );
/// let app = build_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Ticket lifecycle and display
    pub tickets: TicketService,
    /// Form submissions
    pub forms: FormService,
    /// Reservations
    pub reservations: ReservationService,
    /// Events
    pub events: EventService,
    /// Macro renderer for ticket summaries
    pub renderer: Arc<dyn MacroRenderer>,
    /// Public base URL links are built from
    pub base_url: Arc<str>,
    /// Known staff tokens
    pub staff: Arc<StaffDirectory>,
    /// Readiness probe for `/ready`
    pub readiness: Arc<dyn Readiness>,
}

impl AppState {
    /// Wires the services on top of `collections`.
    #[must_use]
    pub fn new(
        collections: Collections,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn MacroRenderer>,
        base_url: &str,
        staff: StaffDirectory,
    ) -> Self {
        let tickets = TicketService::new(collections, clock);
        Self {
            forms: FormService::new(tickets.clone()),
            reservations: ReservationService::new(tickets.clone()),
            events: EventService::new(tickets.clone()),
            tickets,
            renderer,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            staff: Arc::new(staff),
            readiness: Arc::new(AlwaysReady),
        }
    }

    /// Replaces the readiness probe.
    #[must_use]
    pub fn with_readiness(mut self, readiness: Arc<dyn Readiness>) -> Self {
        self.readiness = readiness;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn staff_directory_maps_tokens() {
        let staff = StaffDirectory::new([("secret", "editor")]);
        assert_eq!(staff.identify("secret"), Some(Identity::staff("editor")));
        assert_eq!(staff.identify("guess"), None);
        assert_eq!(staff.len(), 1);
        assert!(StaffDirectory::default().is_empty());
    }
}
