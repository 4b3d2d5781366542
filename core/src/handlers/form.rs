//! Handler for form submission tickets (`FRM`).

use super::TicketHandler;
use crate::collections::Collections;
use crate::error::{HandlerError, StoreError};
use crate::links::{Action, Link, LinkTarget, with_query};
use crate::models::{FormDefinition, FormSubmission};
use crate::render::{Markup, RenderContext};
use crate::types::SubmissionId;
use serde_json::json;

/// Shown instead of the summary once the submission is gone
pub const DELETED_NOTICE: &str = "The submission has been deleted.";

/// A ticket backed by a form submission.
#[derive(Clone, Debug)]
pub struct FormHandler {
    submission: Option<FormSubmission>,
    form: Option<FormDefinition>,
}

impl FormHandler {
    /// Wraps an already loaded submission and its form.
    #[must_use]
    pub const fn new(submission: Option<FormSubmission>, form: Option<FormDefinition>) -> Self {
        Self { submission, form }
    }

    /// Loads the submission and its form definition.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Store`] if a collection lookup fails.
    #[tracing::instrument(skip(collections))]
    pub async fn load(handler_id: &str, collections: &Collections) -> Result<Self, HandlerError> {
        let Some(id) = SubmissionId::parse_handler_id(handler_id) else {
            return Ok(Self::new(None, None));
        };

        let submission = collections.submissions.submission(id).await?;
        let form = match &submission {
            Some(submission) => collections.forms.form(&submission.name).await?,
            None => None,
        };

        Ok(Self::new(submission, form))
    }

    /// Whether the submission behind `handler_id` no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn is_missing(
        handler_id: &str,
        collections: &Collections,
    ) -> Result<bool, StoreError> {
        match SubmissionId::parse_handler_id(handler_id) {
            Some(id) => Ok(collections.submissions.submission(id).await?.is_none()),
            None => Ok(true),
        }
    }

    /// The wrapped submission
    #[must_use]
    pub const fn submission(&self) -> Option<&FormSubmission> {
        self.submission.as_ref()
    }
}

/// Context for the `display_form` macro.
pub(crate) fn display_form_context(
    submission: &FormSubmission,
    form: Option<&FormDefinition>,
) -> serde_json::Value {
    json!({
        "form": {
            "name": submission.name,
            "title": form.map_or(submission.name.as_str(), |form| form.title.as_str()),
        },
        "title": submission.title,
        "email": submission.email,
        "fields": submission.fields,
    })
}

impl TicketHandler for FormHandler {
    fn is_deleted(&self) -> bool {
        self.submission.is_none()
    }

    fn email(&self) -> &str {
        self.submission.as_ref().map_or("", |s| s.email.as_str())
    }

    fn title(&self) -> Result<String, HandlerError> {
        Ok(self
            .submission
            .as_ref()
            .map(|s| s.title.clone())
            .unwrap_or_default())
    }

    fn group(&self) -> &str {
        match (&self.form, &self.submission) {
            (Some(form), _) => &form.title,
            (None, Some(submission)) => &submission.name,
            (None, None) => "",
        }
    }

    fn render_summary(&self, ctx: &RenderContext<'_>) -> Result<Markup, HandlerError> {
        let Some(submission) = &self.submission else {
            return Ok(Markup::new(DELETED_NOTICE));
        };

        let context = display_form_context(submission, self.form.as_ref());
        Ok(ctx.renderer.render_macro("display_form", &context)?)
    }

    fn list_actions(&self, ctx: &RenderContext<'_>) -> Vec<Action> {
        let Some(submission) = &self.submission else {
            return Vec::new();
        };

        let url = with_query(
            &ctx.links.link(LinkTarget::Submission(submission.id), None),
            &[("edit", ""), ("return-to", &ctx.links.current_url())],
        );

        vec![Action::Link(Link::new("Edit submission", url, "edit-link"))]
    }
}
