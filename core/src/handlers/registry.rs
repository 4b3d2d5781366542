//! Maps ticket type codes to handler kinds.
//!
//! The process-wide registry is built once on first use and never changes
//! afterwards.

use crate::error::HandlerError;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The handler variants tickets can be backed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Form submissions
    Form,
    /// Reservations sharing a token
    Reservation,
    /// Submitted events
    Event,
}

/// Type code of form submission tickets
pub const FORM_CODE: &str = "FRM";
/// Type code of reservation tickets
pub const RESERVATION_CODE: &str = "RSV";
/// Type code of event submission tickets
pub const EVENT_CODE: &str = "EVN";

/// Lookup table from type code to handler kind.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, HandlerKind>,
}

impl HandlerRegistry {
    /// Creates an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers `kind` under `code`, replacing any previous entry.
    #[must_use]
    pub fn register(mut self, code: impl Into<String>, kind: HandlerKind) -> Self {
        self.entries.insert(code.into(), kind);
        self
    }

    /// Looks up the handler kind of a type code.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnknownHandlerType`] for unregistered codes.
    pub fn resolve(&self, code: &str) -> Result<HandlerKind, HandlerError> {
        self.entries
            .get(code)
            .copied()
            .ok_or_else(|| HandlerError::UnknownHandlerType(code.to_string()))
    }

    /// Registered codes, sorted
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The code `kind` is registered under
    #[must_use]
    pub fn code_of(&self, kind: HandlerKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, registered)| **registered == kind)
            .map(|(code, _)| code.as_str())
    }
}

static REGISTRY: LazyLock<HandlerRegistry> = LazyLock::new(|| {
    HandlerRegistry::new()
        .register(FORM_CODE, HandlerKind::Form)
        .register(RESERVATION_CODE, HandlerKind::Reservation)
        .register(EVENT_CODE, HandlerKind::Event)
});

/// The process-wide registry
#[must_use]
pub fn registry() -> &'static HandlerRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_codes_resolve() {
        assert_eq!(registry().resolve("FRM"), Ok(HandlerKind::Form));
        assert_eq!(registry().resolve("RSV"), Ok(HandlerKind::Reservation));
        assert_eq!(registry().resolve("EVN"), Ok(HandlerKind::Event));
    }

    #[test]
    fn unknown_code_fails() {
        assert_eq!(
            registry().resolve("XYZ"),
            Err(HandlerError::UnknownHandlerType("XYZ".to_string()))
        );
    }

    #[test]
    fn codes_and_reverse_lookup() {
        assert_eq!(registry().codes().collect::<Vec<_>>(), ["EVN", "FRM", "RSV"]);
        assert_eq!(registry().code_of(HandlerKind::Reservation), Some("RSV"));
        assert_eq!(HandlerRegistry::new().code_of(HandlerKind::Form), None);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = HandlerRegistry::new()
            .register("X", HandlerKind::Form)
            .register("X", HandlerKind::Event);
        assert_eq!(registry.resolve("X"), Ok(HandlerKind::Event));
    }
}
