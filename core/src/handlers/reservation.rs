//! Handler for reservation tickets (`RSV`).
//!
//! One booking request may create several reservations sharing a token; the
//! handler always works on the whole set.

use super::TicketHandler;
use super::form::display_form_context;
use crate::collections::Collections;
use crate::error::{HandlerError, StoreError};
use crate::links::{Action, DeleteLink, Link, LinkTarget, RequestMethod, with_query};
use crate::models::{FormDefinition, FormSubmission, Reservation, Resource, ResourceKind};
use crate::render::{Markup, RenderContext};
use crate::types::{ReservationToken, SubmissionId};
use serde_json::json;

/// Shown instead of the summary once the reservations are gone
pub const DELETED_NOTICE: &str = "The reservation has been deleted.";

/// A ticket backed by the reservations of one token.
#[derive(Clone, Debug)]
pub struct ReservationHandler {
    token: Option<ReservationToken>,
    reservations: Vec<Reservation>,
    resource: Option<Resource>,
    submission: Option<FormSubmission>,
    form: Option<FormDefinition>,
}

/// Id of the data-collection submission belonging to a token.
#[must_use]
pub const fn submission_id_for(token: ReservationToken) -> SubmissionId {
    SubmissionId::from_uuid(*token.as_uuid())
}

impl ReservationHandler {
    /// Wraps already loaded records.
    #[must_use]
    pub const fn new(
        token: Option<ReservationToken>,
        reservations: Vec<Reservation>,
        resource: Option<Resource>,
        submission: Option<FormSubmission>,
    ) -> Self {
        Self {
            token,
            reservations,
            resource,
            submission,
            form: None,
        }
    }

    /// Loads the reservations of a token, their resource and the optional
    /// data-collection submission.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Store`] if a lookup fails, or if reservations
    /// exist but their resource does not.
    #[tracing::instrument(skip(collections))]
    pub async fn load(handler_id: &str, collections: &Collections) -> Result<Self, HandlerError> {
        let Some(token) = ReservationToken::parse_handler_id(handler_id) else {
            return Ok(Self::new(None, Vec::new(), None, None));
        };

        let reservations = collections.reservations.reservations_by_token(token).await?;
        let Some(first) = reservations.first() else {
            return Ok(Self::new(Some(token), reservations, None, None));
        };

        let resource = collections
            .resources
            .resource(first.resource)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("resource {}", first.resource)))?;

        let submission = collections
            .submissions
            .submission(submission_id_for(token))
            .await?;
        let form = match &submission {
            Some(submission) => collections.forms.form(&submission.name).await?,
            None => None,
        };

        let mut handler = Self::new(Some(token), reservations, Some(resource), submission);
        handler.form = form;
        Ok(handler)
    }

    /// Whether no reservation is left for `handler_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn is_missing(
        handler_id: &str,
        collections: &Collections,
    ) -> Result<bool, StoreError> {
        match ReservationToken::parse_handler_id(handler_id) {
            Some(token) => Ok(collections
                .reservations
                .reservations_by_token(token)
                .await?
                .is_empty()),
            None => Ok(true),
        }
    }

    /// The reservations of the token
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    fn describe(kind: &ResourceKind, reservation: &Reservation) -> Result<String, HandlerError> {
        match kind {
            ResourceKind::Daypass => Ok(format!(
                "{} ({})",
                reservation.start.format("%d.%m.%Y"),
                reservation.quota
            )),
            ResourceKind::Room => Ok(format!(
                "{} - {}",
                reservation.start.format("%d.%m.%Y %H:%M"),
                reservation.end.format("%H:%M")
            )),
            ResourceKind::Other(other) => Err(HandlerError::UnsupportedResourceType(other.clone())),
        }
    }
}

impl TicketHandler for ReservationHandler {
    fn is_deleted(&self) -> bool {
        self.reservations.is_empty()
    }

    fn email(&self) -> &str {
        self.reservations.first().map_or("", |r| r.email.as_str())
    }

    fn title(&self) -> Result<String, HandlerError> {
        let Some(resource) = &self.resource else {
            return Ok(String::new());
        };

        let parts = self
            .reservations
            .iter()
            .map(|reservation| Self::describe(&resource.resource_type, reservation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(parts.join(", "))
    }

    fn group(&self) -> &str {
        self.resource.as_ref().map_or("", |r| r.title.as_str())
    }

    fn render_summary(&self, ctx: &RenderContext<'_>) -> Result<Markup, HandlerError> {
        if self.is_deleted() {
            return Ok(Markup::new(DELETED_NOTICE));
        }

        let context = json!({
            "resource": self.resource,
            "reservations": self.reservations,
        });
        let mut markup = ctx.renderer.render_macro("reservations", &context)?;

        if let Some(submission) = &self.submission {
            let context = display_form_context(submission, self.form.as_ref());
            markup.push(&ctx.renderer.render_macro("display_form", &context)?);
        }

        Ok(markup)
    }

    fn list_actions(&self, ctx: &RenderContext<'_>) -> Vec<Action> {
        let (Some(token), Some(first)) = (self.token, self.reservations.first()) else {
            return Vec::new();
        };

        let current = ctx.links.current_url();
        let target = LinkTarget::Reservation(token);
        let mut actions = Vec::with_capacity(3);

        if !first.accepted {
            let url = with_query(
                &ctx.links.link(target, Some("accept")),
                &[("return-to", &current)],
            );
            actions.push(Action::Link(Link::new("Accept reservation", url, "accept-link")));
        }

        actions.push(Action::Delete(DeleteLink {
            text: "Reject reservation".to_string(),
            url: with_query(
                &ctx.links.link(target, Some("reject")),
                &[("return-to", &current)],
            ),
            confirm: "Do you really want to reject this reservation?".to_string(),
            extra_information: Some("Rejecting this reservation can't be undone.".to_string()),
            yes_button_text: Some("Reject reservation".to_string()),
            request_method: RequestMethod::Get,
            redirect_after: Some(current.clone()),
        }));

        if let Some(submission) = &self.submission {
            let url = with_query(
                &ctx.links.link(LinkTarget::Submission(submission.id), None),
                &[
                    ("edit", ""),
                    ("return-to", &current),
                    ("title", "Details about the reservation"),
                ],
            );
            actions.push(Action::Link(Link::new("Edit details", url, "edit-link")));
        }

        actions
    }
}
