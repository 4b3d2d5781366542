//! Custom Axum extractors.
//!
//! - [`Viewer`]: the identity behind the request, anonymous without a token
//! - [`RequireStaff`]: like [`Viewer`] but rejects anonymous requests with 401
//! - [`SessionId`]: the browser session sent in `X-Session-Id`
//! - [`RequestLinks`]: link builder for the current request
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     RequireStaff(identity): RequireStaff,
//!     links: RequestLinks,
//! ) -> Result<Json<TicketDetail>, AppError> {
//!     let detail = state.tickets.detail(id, &identity, &links, &*state.renderer).await?;
//!     Ok(Json(detail))
//! }
//! ```

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use town_core::links::{LinkBuilder, LinkTarget};
use town_core::types::Identity;

/// Header carrying a staff token.
pub const STAFF_TOKEN_HEADER: &str = "X-Staff-Token";

/// Header carrying the browser session id.
pub const SESSION_ID_HEADER: &str = "X-Session-Id";

/// Identity of the caller.
///
/// Requests without `X-Staff-Token` are anonymous; an unknown token is
/// rejected with 401 instead of silently downgrading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(STAFF_TOKEN_HEADER) else {
            return Ok(Self(Identity::Anonymous));
        };

        header
            .to_str()
            .ok()
            .and_then(|token| state.staff.identify(token.trim()))
            .map(Self)
            .ok_or_else(|| AppError::unauthorized("Unknown staff token"))
    }
}

/// Staff identity; anonymous requests are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireStaff(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Viewer(identity) = Viewer::from_request_parts(parts, state).await?;
        if identity.is_staff() {
            Ok(Self(identity))
        } else {
            Err(AppError::unauthorized("Staff login required"))
        }
    }
}

/// Browser session id from `X-Session-Id`, if sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self(session))
    }
}

/// Absolute links rooted at the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLinks {
    base: String,
    current: String,
}

impl RequestLinks {
    /// Links for a request to `path_and_query` below `base`
    #[must_use]
    pub fn new(base: &str, path_and_query: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        let current = format!("{base}{path_and_query}");
        Self { base, current }
    }

    /// Whether `url` points into this application
    #[must_use]
    pub fn is_local(&self, url: &str) -> bool {
        url.strip_prefix(&self.base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
    }
}

impl LinkBuilder for RequestLinks {
    fn link(&self, target: LinkTarget, view: Option<&str>) -> String {
        format!("{}{}", self.base, target.path(view))
    }

    fn current_url(&self) -> String {
        self.current.clone()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestLinks {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        Ok(Self::new(&state.base_url, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_core::types::EventId;

    #[test]
    fn links_are_rooted_at_the_base_url() {
        let links = RequestLinks::new("https://town.example/", "/api/tickets/1?x=1");
        let id = EventId::new();

        assert_eq!(links.current_url(), "https://town.example/api/tickets/1?x=1");
        assert_eq!(
            links.link(LinkTarget::Event(id), Some("publish")),
            format!("https://town.example/api/events/{id}/publish")
        );
    }

    #[test]
    fn only_local_urls_are_local() {
        let links = RequestLinks::new("https://town.example", "/");
        assert!(links.is_local("https://town.example/api/tickets/1"));
        assert!(links.is_local("https://town.example"));
        assert!(!links.is_local("https://town.example.evil.org/"));
        assert!(!links.is_local("https://elsewhere.org/api"));
    }
}
