//! Stand-ins for the clock, the link builder and the macro renderer.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use town_core::error::RenderError;
use town_core::links::{LinkBuilder, LinkTarget};
use town_core::reducer::Clock;
use town_core::render::{MacroRenderer, Markup};

/// Fixed clock for deterministic tests
///
/// # Example
///
/// ```
/// use town_testing::mocks::FixedClock;
/// use town_core::reducer::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// Panics if the hardcoded timestamp fails to parse, which never happens.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Link builder rooted at `https://town.example`.
#[derive(Debug, Clone)]
pub struct StaticLinks {
    base: String,
    current: String,
}

/// Base URL used by [`StaticLinks`]
pub const BASE_URL: &str = "https://town.example";

impl StaticLinks {
    /// Links for a page at `current_path`
    #[must_use]
    pub fn at(current_path: &str) -> Self {
        Self {
            base: BASE_URL.to_string(),
            current: format!("{BASE_URL}{current_path}"),
        }
    }
}

impl Default for StaticLinks {
    fn default() -> Self {
        Self::at("/api/tickets")
    }
}

impl LinkBuilder for StaticLinks {
    fn link(&self, target: LinkTarget, view: Option<&str>) -> String {
        format!("{}{}", self.base, target.path(view))
    }

    fn current_url(&self) -> String {
        self.current.clone()
    }
}

/// Renderer that echoes the macro name and its JSON context.
///
/// Records every call so tests can check which macros were used.
#[derive(Debug, Clone, Default)]
pub struct EchoRenderer {
    calls: Arc<Mutex<Vec<String>>>,
}

impl EchoRenderer {
    /// Create a new renderer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the macros rendered so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl MacroRenderer for EchoRenderer {
    #[allow(clippy::unwrap_used)]
    fn render_macro(&self, name: &str, context: &serde_json::Value) -> Result<Markup, RenderError> {
        self.calls.lock().unwrap().push(name.to_string());
        Ok(Markup::new(format!(
            "<div data-macro=\"{name}\">{context}</div>"
        )))
    }
}

/// Renderer that fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRenderer;

impl MacroRenderer for FailingRenderer {
    fn render_macro(&self, name: &str, _context: &serde_json::Value) -> Result<Markup, RenderError> {
        Err(RenderError::UnknownMacro(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_core::types::TicketId;

    #[test]
    fn fixed_clock_does_not_advance() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn static_links_are_absolute() {
        let links = StaticLinks::at("/api/tickets/1");
        let id = TicketId::new();
        assert_eq!(
            links.link(LinkTarget::Ticket(id), Some("accept")),
            format!("https://town.example/api/tickets/{id}/accept")
        );
        assert_eq!(links.current_url(), "https://town.example/api/tickets/1");
    }

    #[test]
    fn echo_renderer_records_calls() {
        let renderer = EchoRenderer::new();
        let markup = renderer
            .render_macro("display_event", &serde_json::json!({"event": 1}))
            .unwrap_or_default();
        assert!(markup.as_str().contains("display_event"));
        assert_eq!(renderer.calls(), ["display_event"]);
    }
}
