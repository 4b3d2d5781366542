//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod events;
pub mod health;
pub mod reservations;
pub mod submissions;
pub mod tickets;

use crate::extractors::RequestLinks;
use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

// Re-export common handler utilities
pub use health::{health_check, readiness_check};

/// The `return-to` query parameter carried by action links.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    /// Where to send the browser afterwards
    #[serde(rename = "return-to")]
    pub return_to: Option<String>,
}

/// Redirects (303) to `return-to` when it points into the application,
/// otherwise answers with `body` as JSON.
pub(crate) fn respond<T: Serialize>(body: T, return_to: ReturnTo, links: &RequestLinks) -> Response {
    match return_to.return_to.filter(|url| links.is_local(url)) {
        Some(url) => Redirect::to(&url).into_response(),
        None => Json(body).into_response(),
    }
}
