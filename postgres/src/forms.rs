//! Form definitions and submissions.

use crate::{PgTownStore, column, database, parsed, require_row};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use town_core::collections::{FormCollection, Result, SubmissionCollection};
use town_core::models::{FormDefinition, FormSubmission, SubmissionField, SubmissionState};
use town_core::types::{ReservationToken, SubmissionId};
use uuid::Uuid;

fn row_to_submission(row: &PgRow) -> Result<FormSubmission> {
    let fields: Json<Vec<SubmissionField>> = column(row, "fields")?;
    Ok(FormSubmission {
        id: SubmissionId::from_uuid(column::<Uuid>(row, "id")?),
        name: column(row, "name")?,
        title: column(row, "title")?,
        email: column(row, "email")?,
        state: parsed::<SubmissionState>(row, "state")?,
        fields: fields.0,
        reservation: column::<Option<Uuid>>(row, "reservation")?
            .map(ReservationToken::from_uuid),
    })
}

#[async_trait]
impl FormCollection for PgTownStore {
    async fn form(&self, name: &str) -> Result<Option<FormDefinition>> {
        let row = sqlx::query("SELECT name, title, lead FROM forms WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database("load form", &e))?;

        row.map(|row| {
            Ok(FormDefinition {
                name: column(&row, "name")?,
                title: column(&row, "title")?,
                lead: column(&row, "lead")?,
            })
        })
        .transpose()
    }

    async fn insert_form(&self, form: &FormDefinition) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO forms (name, title, lead)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET title = EXCLUDED.title, lead = EXCLUDED.lead
            ",
        )
        .bind(&form.name)
        .bind(&form.title)
        .bind(&form.lead)
        .execute(&self.pool)
        .await
        .map_err(|e| database("store form", &e))?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionCollection for PgTownStore {
    async fn submission(&self, id: SubmissionId) -> Result<Option<FormSubmission>> {
        let row = sqlx::query(
            "SELECT id, name, title, email, state, fields, reservation FROM submissions WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("load submission", &e))?;

        row.as_ref().map(row_to_submission).transpose()
    }

    async fn insert_submission(&self, submission: &FormSubmission) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO submissions (id, name, title, email, state, fields, reservation)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(*submission.id.as_uuid())
        .bind(&submission.name)
        .bind(&submission.title)
        .bind(&submission.email)
        .bind(submission.state.as_str())
        .bind(Json(&submission.fields))
        .bind(submission.reservation.map(|token| *token.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|e| database("insert submission", &e))?;
        Ok(())
    }

    async fn update_submission(&self, submission: &FormSubmission) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE submissions
            SET title = $2, email = $3, state = $4, fields = $5
            WHERE id = $1
            ",
        )
        .bind(*submission.id.as_uuid())
        .bind(&submission.title)
        .bind(&submission.email)
        .bind(submission.state.as_str())
        .bind(Json(&submission.fields))
        .execute(&self.pool)
        .await
        .map_err(|e| database("update submission", &e))?;

        require_row(
            result.rows_affected(),
            format_args!("submission {}", submission.id),
        )
    }

    async fn remove_submission(&self, id: SubmissionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database("remove submission", &e))?;
        Ok(result.rows_affected() > 0)
    }
}
