//! Form submission workflow: submit, complete (opens the ticket), edit.

use super::{ServiceError, TicketService, require_staff};
use crate::handlers::FORM_CODE;
use crate::models::{FormSubmission, SubmissionField, SubmissionState};
use crate::ticket::Ticket;
use crate::types::{Identity, SubmissionId};
use serde::Deserialize;

/// Changes to a submission.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmissionUpdate {
    /// New title, kept when absent
    pub title: Option<String>,
    /// New contact address, kept when absent
    pub email: Option<String>,
    /// Replacement answers, kept when absent
    pub fields: Option<Vec<SubmissionField>>,
}

/// Form submission service
#[derive(Clone)]
pub struct FormService {
    tickets: TicketService,
}

impl FormService {
    /// Create a new form service
    #[must_use]
    pub const fn new(tickets: TicketService) -> Self {
        Self { tickets }
    }

    async fn load(&self, id: SubmissionId) -> Result<FormSubmission, ServiceError> {
        self.tickets
            .collections()
            .submissions
            .submission(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("submission {id}")))
    }

    /// Stores a pending submission of the form `form_name`.
    ///
    /// An empty title falls back to the form title.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the form does not exist
    /// - [`ServiceError::Invalid`] if the e-mail address is empty
    #[tracing::instrument(skip(self, fields))]
    pub async fn submit(
        &self,
        form_name: &str,
        title: &str,
        email: &str,
        fields: Vec<SubmissionField>,
    ) -> Result<FormSubmission, ServiceError> {
        let collections = self.tickets.collections();
        let form = collections
            .forms
            .form(form_name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("form {form_name}")))?;

        if email.trim().is_empty() {
            return Err(ServiceError::Invalid("an e-mail address is required".into()));
        }

        let title = if title.trim().is_empty() {
            form.title.as_str()
        } else {
            title
        };

        let submission = FormSubmission::pending(&form.name, title, email, fields);
        collections.submissions.insert_submission(&submission).await?;
        tracing::info!(id = %submission.id, form = %form.name, "Submission stored");

        Ok(submission)
    }

    /// Completes a pending submission and opens its ticket.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the submission does not exist
    /// - [`ServiceError::Conflict`] if it was already completed
    /// - [`ServiceError::Forbidden`] if it collects reservation details; those
    ///   are completed by finalizing the reservation
    #[tracing::instrument(skip(self))]
    pub async fn complete(
        &self,
        id: SubmissionId,
    ) -> Result<(FormSubmission, Ticket), ServiceError> {
        let mut submission = self.load(id).await?;
        if let Some(token) = submission.reservation {
            return Err(ServiceError::Forbidden(format!(
                "submission {id} belongs to reservation {token} and is completed by finalizing it"
            )));
        }
        if submission.state == SubmissionState::Complete {
            return Err(ServiceError::Conflict(format!(
                "submission {id} is already complete"
            )));
        }

        let ticket = self.tickets.prepare(FORM_CODE, &id.handler_id()).await?;

        submission.state = SubmissionState::Complete;
        self.tickets
            .collections()
            .submissions
            .update_submission(&submission)
            .await?;
        self.tickets.commit(&ticket).await?;

        Ok((submission, ticket))
    }

    /// Edits a submission. Pending submissions are editable by their
    /// submitter, completed ones only by staff.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the submission does not exist
    /// - [`ServiceError::Forbidden`] for anonymous edits of a completed submission
    #[tracing::instrument(skip(self, update))]
    pub async fn edit(
        &self,
        id: SubmissionId,
        identity: &Identity,
        update: SubmissionUpdate,
    ) -> Result<FormSubmission, ServiceError> {
        let mut submission = self.load(id).await?;
        if submission.state == SubmissionState::Complete {
            require_staff(identity, "edit completed submissions")?;
        }

        if let Some(title) = update.title {
            submission.title = title;
        }
        if let Some(email) = update.email {
            submission.email = email;
        }
        if let Some(fields) = update.fields {
            submission.fields = fields;
        }

        self.tickets
            .collections()
            .submissions
            .update_submission(&submission)
            .await?;

        Ok(submission)
    }
}
