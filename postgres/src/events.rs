//! Event collection.

use crate::{PgTownStore, column, database, parsed, require_row};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use town_core::collections::{EventCollection, Result};
use town_core::models::{Event, EventState};
use town_core::types::EventId;
use uuid::Uuid;

fn row_to_event(row: &PgRow) -> Result<Event> {
    Ok(Event {
        id: EventId::from_uuid(column::<Uuid>(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        location: column(row, "location")?,
        start: column(row, "start_at")?,
        end: column(row, "end_at")?,
        state: parsed::<EventState>(row, "state")?,
        submitter_email: column(row, "submitter_email")?,
    })
}

#[async_trait]
impl EventCollection for PgTownStore {
    async fn event(&self, id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, location, start_at, end_at, state, submitter_email
            FROM events
            WHERE id = $1
            ",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("load event", &e))?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO events
                (id, title, description, location, start_at, end_at, state, submitter_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start)
        .bind(event.end)
        .bind(event.state.as_str())
        .bind(&event.submitter_email)
        .execute(&self.pool)
        .await
        .map_err(|e| database("insert event", &e))?;
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE events
            SET title = $2,
                description = $3,
                location = $4,
                start_at = $5,
                end_at = $6,
                state = $7
            WHERE id = $1
            ",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start)
        .bind(event.end)
        .bind(event.state.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| database("update event", &e))?;

        require_row(result.rows_affected(), format_args!("event {}", event.id))
    }

    async fn remove_event(&self, id: EventId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database("remove event", &e))?;

        if result.rows_affected() > 0 {
            tracing::info!(%id, "Event row removed");
        }
        Ok(result.rows_affected() > 0)
    }
}
