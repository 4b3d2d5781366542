//! Resources, allocations and reservations.

use crate::{PgTownStore, column, database, parsed, quota_from_db, quota_to_db};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use town_core::collections::{ReservationCollection, ResourceCollection, Result};
use town_core::models::{Allocation, Reservation, ReservationStatus, Resource, ResourceKind};
use town_core::types::{AllocationId, ReservationId, ReservationToken, ResourceId};
use uuid::Uuid;

fn row_to_reservation(row: &PgRow) -> Result<Reservation> {
    Ok(Reservation {
        id: ReservationId::from_uuid(column::<Uuid>(row, "id")?),
        token: ReservationToken::from_uuid(column::<Uuid>(row, "token")?),
        resource: ResourceId::from_uuid(column::<Uuid>(row, "resource")?),
        email: column(row, "email")?,
        start: column(row, "start_at")?,
        end: column(row, "end_at")?,
        quota: quota_from_db(row)?,
        status: parsed::<ReservationStatus>(row, "status")?,
        accepted: column(row, "accepted")?,
        session_id: column(row, "session_id")?,
    })
}

#[async_trait]
impl ResourceCollection for PgTownStore {
    async fn resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        let row = sqlx::query(
            "SELECT id, name, title, resource_type, definition FROM resources WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("load resource", &e))?;

        row.map(|row| {
            let kind: String = column(&row, "resource_type")?;
            Ok(Resource {
                id: ResourceId::from_uuid(column::<Uuid>(&row, "id")?),
                name: column(&row, "name")?,
                title: column(&row, "title")?,
                resource_type: ResourceKind::from(kind.as_str()),
                definition: column(&row, "definition")?,
            })
        })
        .transpose()
    }

    async fn allocation(&self, id: AllocationId) -> Result<Option<Allocation>> {
        let row = sqlx::query(
            r"
            SELECT id, resource, start_at, end_at, quota, partly_available
            FROM allocations
            WHERE id = $1
            ",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("load allocation", &e))?;

        row.map(|row| {
            Ok(Allocation {
                id: AllocationId::from_uuid(column::<Uuid>(&row, "id")?),
                resource: ResourceId::from_uuid(column::<Uuid>(&row, "resource")?),
                start: column(&row, "start_at")?,
                end: column(&row, "end_at")?,
                quota: quota_from_db(&row)?,
                partly_available: column(&row, "partly_available")?,
            })
        })
        .transpose()
    }

    async fn insert_resource(&self, resource: &Resource) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO resources (id, name, title, resource_type, definition)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                title = EXCLUDED.title,
                resource_type = EXCLUDED.resource_type,
                definition = EXCLUDED.definition
            ",
        )
        .bind(*resource.id.as_uuid())
        .bind(&resource.name)
        .bind(&resource.title)
        .bind(resource.resource_type.as_str())
        .bind(&resource.definition)
        .execute(&self.pool)
        .await
        .map_err(|e| database("store resource", &e))?;
        Ok(())
    }

    async fn insert_allocation(&self, allocation: &Allocation) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO allocations (id, resource, start_at, end_at, quota, partly_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                quota = EXCLUDED.quota,
                partly_available = EXCLUDED.partly_available
            ",
        )
        .bind(*allocation.id.as_uuid())
        .bind(*allocation.resource.as_uuid())
        .bind(allocation.start)
        .bind(allocation.end)
        .bind(quota_to_db(allocation.quota)?)
        .bind(allocation.partly_available)
        .execute(&self.pool)
        .await
        .map_err(|e| database("store allocation", &e))?;
        Ok(())
    }
}

#[async_trait]
impl ReservationCollection for PgTownStore {
    async fn reservations_by_token(&self, token: ReservationToken) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r"
            SELECT id, token, resource, email, start_at, end_at, quota, status, accepted,
                   session_id
            FROM reservations
            WHERE token = $1
            ORDER BY seq ASC
            ",
        )
        .bind(*token.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("load reservations", &e))?;

        rows.iter().map(row_to_reservation).collect()
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO reservations
                (id, token, resource, email, start_at, end_at, quota, status, accepted, session_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(*reservation.id.as_uuid())
        .bind(*reservation.token.as_uuid())
        .bind(*reservation.resource.as_uuid())
        .bind(&reservation.email)
        .bind(reservation.start)
        .bind(reservation.end)
        .bind(quota_to_db(reservation.quota)?)
        .bind(reservation.status.as_str())
        .bind(reservation.accepted)
        .bind(&reservation.session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| database("insert reservation", &e))?;
        Ok(())
    }

    async fn approve_reservations(&self, token: ReservationToken) -> Result<u64> {
        let result = sqlx::query("UPDATE reservations SET status = $2 WHERE token = $1")
            .bind(*token.as_uuid())
            .bind(ReservationStatus::Approved.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| database("approve reservations", &e))?;
        Ok(result.rows_affected())
    }

    async fn accept_reservations(&self, token: ReservationToken) -> Result<u64> {
        let result = sqlx::query("UPDATE reservations SET accepted = TRUE WHERE token = $1")
            .bind(*token.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database("accept reservations", &e))?;
        Ok(result.rows_affected())
    }

    async fn remove_reservations(&self, token: ReservationToken) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reservations WHERE token = $1")
            .bind(*token.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database("remove reservations", &e))?;
        Ok(result.rows_affected())
    }
}
