//! Ticket collection.

use crate::{PgTownStore, column, database, parsed, require_row};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use town_core::collections::{Result, TicketCollection};
use town_core::ticket::{Ticket, TicketState};
use town_core::types::TicketId;
use uuid::Uuid;

const COLUMNS: &str = "id, number, handler_code, handler_id, state, user_name, title, \
                       group_name, created, last_state_change, reaction_time, process_time";

fn row_to_ticket(row: &PgRow) -> Result<Ticket> {
    Ok(Ticket {
        id: TicketId::from_uuid(column::<Uuid>(row, "id")?),
        number: column(row, "number")?,
        handler_code: column(row, "handler_code")?,
        handler_id: column(row, "handler_id")?,
        state: parsed::<TicketState>(row, "state")?,
        user: column(row, "user_name")?,
        title: column(row, "title")?,
        group: column(row, "group_name")?,
        created: column(row, "created")?,
        last_state_change: column(row, "last_state_change")?,
        reaction_time: column(row, "reaction_time")?,
        process_time: column(row, "process_time")?,
    })
}

#[async_trait]
impl TicketCollection for PgTownStore {
    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tickets WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database("load ticket", &e))?;

        row.as_ref().map(row_to_ticket).transpose()
    }

    async fn ticket_by_handler(&self, code: &str, handler_id: &str) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM tickets WHERE handler_code = $1 AND handler_id = $2"
        ))
        .bind(code)
        .bind(handler_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("load ticket by handler", &e))?;

        row.as_ref().map(row_to_ticket).transpose()
    }

    async fn ticket_number_exists(&self, number: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tickets WHERE number = $1)")
                .bind(number)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database("check ticket number", &e))?;
        Ok(exists.0)
    }

    async fn tickets(&self, state: Option<TicketState>) -> Result<Vec<Ticket>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE $1::TEXT IS NULL OR state = $1 \
             ORDER BY created DESC, number DESC"
        ))
        .bind(state.map(TicketState::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("list tickets", &e))?;

        rows.iter().map(row_to_ticket).collect()
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO tickets ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(*ticket.id.as_uuid())
        .bind(&ticket.number)
        .bind(&ticket.handler_code)
        .bind(&ticket.handler_id)
        .bind(ticket.state.as_str())
        .bind(&ticket.user)
        .bind(&ticket.title)
        .bind(&ticket.group)
        .bind(ticket.created)
        .bind(ticket.last_state_change)
        .bind(ticket.reaction_time)
        .bind(ticket.process_time)
        .execute(&self.pool)
        .await
        .map_err(|e| database("insert ticket", &e))?;

        tracing::debug!(number = %ticket.number, "Ticket row inserted");
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE tickets
            SET state = $2,
                user_name = $3,
                title = $4,
                group_name = $5,
                last_state_change = $6,
                reaction_time = $7,
                process_time = $8
            WHERE id = $1
            ",
        )
        .bind(*ticket.id.as_uuid())
        .bind(ticket.state.as_str())
        .bind(&ticket.user)
        .bind(&ticket.title)
        .bind(&ticket.group)
        .bind(ticket.last_state_change)
        .bind(ticket.reaction_time)
        .bind(ticket.process_time)
        .execute(&self.pool)
        .await
        .map_err(|e| database("update ticket", &e))?;

        require_row(result.rows_affected(), format_args!("ticket {}", ticket.id))
    }
}
