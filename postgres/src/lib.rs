//! `PostgreSQL` collections for Town.
//!
//! [`PgTownStore`] implements every collection trait from `town-core` on a
//! single connection pool:
//!
//! - tickets, with unique numbers and one ticket per handler id
//! - form definitions and submissions (answers stored as JSONB)
//! - resources, allocations and reservations grouped by token
//! - submitted events
//!
//! # Example
//!
//! ```ignore
//! use town_postgres::PgTownStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PgTownStore::connect("postgres://localhost/town", 10).await?;
//!     store.migrate().await?;
//!     let collections = store.collections();
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod forms;
mod reservations;
mod tickets;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Decode, Postgres, Row, Type};
use std::sync::Arc;
use town_core::collections::Collections;
use town_core::error::StoreError;

/// Every Town collection backed by one `PostgreSQL` pool.
#[derive(Clone, Debug)]
pub struct PgTownStore {
    pool: PgPool,
}

impl PgTownStore {
    /// Connects to `database_url` with at most `max_connections` pooled
    /// connections.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the pool cannot be created.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Checks that the database answers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the probe query fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| database("ping", &e))?;
        Ok(())
    }

    /// All collections backed by this store
    #[must_use]
    pub fn collections(&self) -> Collections {
        Collections::shared(Arc::new(self.clone()))
    }
}

/// Maps a driver error, turning unique violations into conflicts.
fn database(action: &str, error: &sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = error {
        if db_err.is_unique_violation() {
            metrics::counter!("town.store.conflicts", "action" => action.to_string())
                .increment(1);
            return StoreError::Conflict(format!("Failed to {action}: {db_err}"));
        }
    }
    tracing::warn!(action, %error, "Database error");
    StoreError::Database(format!("Failed to {action}: {error}"))
}

/// Reads one column, reporting decode failures as serialization errors.
fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Serialization(format!("column {name}: {e}")))
}

/// Parses a text column into one of the domain enums.
fn parsed<T>(row: &PgRow, name: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(StoreError::Serialization)
}

/// Quotas are stored as `INTEGER`.
fn quota_to_db(quota: u32) -> Result<i32, StoreError> {
    i32::try_from(quota).map_err(|_| StoreError::Serialization(format!("quota {quota} too large")))
}

fn quota_from_db(row: &PgRow) -> Result<u32, StoreError> {
    let quota: i32 = column(row, "quota")?;
    u32::try_from(quota).map_err(|_| StoreError::Serialization(format!("negative quota {quota}")))
}

/// Fails with [`StoreError::NotFound`] when an update touched no row.
fn require_row(affected: u64, what: impl std::fmt::Display) -> Result<(), StoreError> {
    if affected == 0 {
        Err(StoreError::NotFound(what.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotas_must_fit_the_column() {
        assert_eq!(quota_to_db(3), Ok(3));
        assert!(matches!(
            quota_to_db(u32::MAX),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn untouched_updates_are_not_found() {
        assert_eq!(
            require_row(0, "ticket 1"),
            Err(StoreError::NotFound("ticket 1".into()))
        );
        assert_eq!(require_row(1, "ticket 1"), Ok(()));
    }

    #[test]
    fn other_driver_errors_map_to_database() {
        let error = database("load ticket", &sqlx::Error::RowNotFound);
        assert!(matches!(error, StoreError::Database(msg) if msg.starts_with("Failed to load ticket")));
    }
}
