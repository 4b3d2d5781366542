//! Error types for the ticket subsystem.

use thiserror::Error;

/// Errors raised by collection implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend failure (connection, query)
    #[error("Database error: {0}")]
    Database(String),

    /// A stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint could not be satisfied
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Errors raised while resolving or rendering a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// No handler is registered for the ticket's type code
    #[error("Unknown handler type: {0}")]
    UnknownHandlerType(String),

    /// A reservation points at a resource type that cannot be titled
    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    /// The macro renderer failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Loading the underlying object failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by a macro renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No macro with this name is registered
    #[error("Unknown macro: {0}")]
    UnknownMacro(String),

    /// The template failed to render
    #[error("Template error: {0}")]
    Template(String),
}

/// Reasons a lifecycle transition was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The actor may not perform transitions (anonymous)
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// The transition is not allowed from the current state
    #[error("Invalid transition: cannot {action} when {state}")]
    InvalidTransition {
        /// Requested transition
        action: &'static str,
        /// State the record was in
        state: &'static str,
    },
}
