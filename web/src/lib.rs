//! Axum HTTP surface for the Town ticket subsystem.
//!
//! Handlers translate requests into calls on the services in
//! `town_core::services` and map [`town_core::services::ServiceError`] onto
//! status codes through [`AppError`].
//!
//! # Request Flow
//!
//! 1. **Extract** the viewer (`X-Staff-Token`), session and link builder
//! 2. **Call** the service for the endpoint
//! 3. **Map** the result to JSON, or to a 303 redirect when the request
//!    carries a local `return-to`
//!
//! # Example
//!
//! ```ignore
//! use town_web::{AppState, HandlebarsRenderer, StaffDirectory, build_router};
//!
//! let state = AppState::new(
//!     collections,
//!     Arc::new(SystemClock),
//!     Arc::new(HandlebarsRenderer::new()?),
//!     "https://town.example",
//!     StaffDirectory::new([("secret", "editor")]),
//! );
//! let app = build_router(state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod render;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use extractors::{RequestLinks, RequireStaff, SessionId, Viewer};
pub use metrics::register_town_metrics;
pub use render::HandlebarsRenderer;
pub use routes::build_router;
pub use state::{AlwaysReady, AppState, Readiness, StaffDirectory};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
