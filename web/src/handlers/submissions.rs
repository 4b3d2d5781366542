//! Form submission endpoints.

use crate::error::AppError;
use crate::extractors::Viewer;
use crate::metrics::record_ticket_opened;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use town_core::Ticket;
use town_core::models::{FormSubmission, SubmissionField};
use town_core::services::SubmissionUpdate;
use town_core::types::SubmissionId;
use uuid::Uuid;

/// Body of `POST /api/forms/{name}/submissions`.
#[derive(Debug, Deserialize)]
pub struct NewSubmission {
    /// Title; the form title is used when empty
    #[serde(default)]
    pub title: String,
    /// Contact address
    pub email: String,
    /// Answers
    #[serde(default)]
    pub fields: Vec<SubmissionField>,
}

/// A completed submission and the ticket opened for it.
#[derive(Debug, Serialize)]
pub struct CompletedSubmission {
    /// The submission, now complete
    pub submission: FormSubmission,
    /// The new FRM ticket
    pub ticket: Ticket,
}

/// `POST /api/forms/{name}/submissions`
///
/// # Errors
///
/// 404 for unknown forms, 400 without an e-mail address.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<NewSubmission>,
) -> Result<(StatusCode, Json<FormSubmission>), AppError> {
    let submission = state
        .forms
        .submit(&name, &body.title, &body.email, body.fields)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// `POST /api/submissions/{id}/complete`
///
/// # Errors
///
/// 404 for unknown submissions, 409 if already completed, 403 for
/// submissions collecting reservation details.
pub async fn complete_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletedSubmission>, AppError> {
    let (submission, ticket) = state.forms.complete(SubmissionId::from_uuid(id)).await?;
    record_ticket_opened(&ticket.handler_code);

    Ok(Json(CompletedSubmission { submission, ticket }))
}

/// `PUT /api/submissions/{id}`: open to the submitter while pending,
/// staff only once complete.
///
/// # Errors
///
/// 404 for unknown submissions, 403 for anonymous edits of completed ones.
pub async fn edit_submission(
    State(state): State<AppState>,
    Viewer(identity): Viewer,
    Path(id): Path<Uuid>,
    Json(update): Json<SubmissionUpdate>,
) -> Result<Json<FormSubmission>, AppError> {
    let submission = state
        .forms
        .edit(SubmissionId::from_uuid(id), &identity, update)
        .await?;
    Ok(Json(submission))
}
