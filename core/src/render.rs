//! Markup and the macro renderer seam.

use crate::error::RenderError;
use crate::links::LinkBuilder;
use crate::ticket::Ticket;
use crate::types::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Wraps already rendered HTML
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// The HTML as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends another fragment
    pub fn push(&mut self, other: &Self) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

/// Renders named macros (`display_form`, `reservations`, `display_event`).
pub trait MacroRenderer: Send + Sync {
    /// Renders the macro `name` with a JSON context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownMacro`] if `name` is not registered, or
    /// [`RenderError::Template`] if rendering fails.
    fn render_macro(&self, name: &str, context: &serde_json::Value) -> Result<Markup, RenderError>;
}

/// Everything a handler needs to render a ticket for one request.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Who is viewing
    pub identity: &'a Identity,
    /// URL builder for the request
    pub links: &'a dyn LinkBuilder,
    /// Template renderer
    pub renderer: &'a dyn MacroRenderer,
    /// The ticket being rendered
    pub ticket: &'a Ticket,
}
