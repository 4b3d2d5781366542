//! User-facing actions and the link builder they are built with.

use crate::types::{EventId, ReservationToken, SubmissionId, TicketId};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A plain link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Label
    pub text: String,
    /// Target URL
    pub url: String,
    /// CSS classes for the rendered anchor
    pub classes: Vec<String>,
}

impl Link {
    /// Creates a link with a single CSS class
    #[must_use]
    pub fn new(text: impl Into<String>, url: impl Into<String>, class: &str) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            classes: vec![class.to_string()],
        }
    }
}

/// HTTP method a confirmed delete link is sent with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// `GET`
    Get,
    /// `DELETE`
    #[default]
    Delete,
}

/// A destructive link that asks for confirmation first.
///
/// Without a `yes_button_text` the dialog cannot be confirmed, which is how
/// a disabled delete is expressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLink {
    /// Label
    pub text: String,
    /// Target URL
    pub url: String,
    /// Confirmation question
    pub confirm: String,
    /// Additional text shown in the dialog
    pub extra_information: Option<String>,
    /// Label of the confirming button
    pub yes_button_text: Option<String>,
    /// Method used once confirmed
    pub request_method: RequestMethod,
    /// Where to go after the request succeeded
    pub redirect_after: Option<String>,
}

impl DeleteLink {
    /// Whether the confirmation dialog can be confirmed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.yes_button_text.is_some()
    }
}

/// One entry in a ticket's action list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Plain link
    Link(Link),
    /// Confirmed destructive link
    Delete(DeleteLink),
}

impl Action {
    /// Label of the action
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Link(link) => &link.text,
            Self::Delete(link) => &link.text,
        }
    }

    /// Target URL of the action
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Link(link) => &link.url,
            Self::Delete(link) => &link.url,
        }
    }

    /// Whether the user can actually trigger the action
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        match self {
            Self::Link(_) => true,
            Self::Delete(link) => link.is_enabled(),
        }
    }
}

/// Objects links can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// A ticket
    Ticket(TicketId),
    /// A form submission
    Submission(SubmissionId),
    /// The reservations of a token
    Reservation(ReservationToken),
    /// An event
    Event(EventId),
}

impl LinkTarget {
    /// Path of the target below the API root, e.g. `/api/events/<id>/publish`.
    #[must_use]
    pub fn path(&self, view: Option<&str>) -> String {
        let base = match self {
            Self::Ticket(id) => format!("/api/tickets/{id}"),
            Self::Submission(id) => format!("/api/submissions/{id}"),
            Self::Reservation(token) => format!("/api/reservations/{token}"),
            Self::Event(id) => format!("/api/events/{id}"),
        };

        match view {
            Some(view) => format!("{base}/{view}"),
            None => base,
        }
    }
}

/// Builds absolute URLs for the current request.
pub trait LinkBuilder: Send + Sync {
    /// URL of `target`, optionally of one of its views (`"accept"`, ...)
    fn link(&self, target: LinkTarget, view: Option<&str>) -> String;

    /// URL of the page being rendered
    fn current_url(&self) -> String;
}

/// Appends query parameters to `url`, keeping any that are present.
#[must_use]
pub fn with_query(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_are_encoded() {
        let url = with_query(
            "https://town.example/api/submissions/1",
            &[("edit", ""), ("return-to", "https://town.example/a?b=c")],
        );
        assert_eq!(
            url,
            "https://town.example/api/submissions/1?edit=&return-to=https%3A%2F%2Ftown.example%2Fa%3Fb%3Dc"
        );
    }

    #[test]
    fn existing_query_is_extended() {
        assert_eq!(with_query("/x?a=1", &[("b", "2")]), "/x?a=1&b=2");
        assert_eq!(with_query("/x", &[]), "/x");
    }

    #[test]
    fn target_paths() {
        let id = EventId::new();
        assert_eq!(
            LinkTarget::Event(id).path(Some("publish")),
            format!("/api/events/{id}/publish")
        );
        let token = ReservationToken::new();
        assert_eq!(
            LinkTarget::Reservation(token).path(None),
            format!("/api/reservations/{token}")
        );
    }

    #[test]
    fn delete_link_without_yes_button_is_disabled() {
        let link = DeleteLink {
            text: "Delete event".into(),
            url: "/e".into(),
            confirm: "Sure?".into(),
            extra_information: None,
            yes_button_text: None,
            request_method: RequestMethod::default(),
            redirect_after: None,
        };
        assert!(!Action::Delete(link).is_enabled());
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = Action::Link(Link::new("Accept ticket", "/t/accept", "ticket-accept"));
        let json = serde_json::to_value(&action).unwrap_or_default();
        assert_eq!(json["type"], "link");
        assert_eq!(json["text"], "Accept ticket");
    }
}
