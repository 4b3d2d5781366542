//! Town ticket server.
//!
//! Wires the Postgres store, the Handlebars renderer and the staff
//! directory into the HTTP router.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod config;

use async_trait::async_trait;
use std::sync::Arc;
use town_core::SystemClock;
use town_postgres::PgTownStore;
use town_web::{AppState, HandlebarsRenderer, Readiness, StaffDirectory};

pub use config::Config;

/// Readiness probe pinging the database.
#[derive(Clone)]
pub struct PgReadiness {
    store: PgTownStore,
}

impl PgReadiness {
    /// Probe for `store`
    #[must_use]
    pub const fn new(store: PgTownStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Readiness for PgReadiness {
    async fn check(&self) -> Result<(), String> {
        self.store.ping().await.map_err(|e| e.to_string())
    }
}

/// Connects to the database, runs migrations and builds the router state.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a migration fails or
/// the summary templates do not compile.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = PgTownStore::connect(&config.database.url, config.database.max_connections).await?;
    tracing::info!("Database connected");

    store.migrate().await?;
    tracing::info!("Migrations applied");

    let staff = StaffDirectory::new(config.town.staff_tokens.iter().cloned());
    if staff.is_empty() {
        tracing::warn!("No staff tokens configured, staff endpoints will reject every request");
    }

    let renderer = HandlebarsRenderer::new()?;
    let state = AppState::new(
        store.collections(),
        Arc::new(SystemClock),
        Arc::new(renderer),
        &config.town.base_url,
        staff,
    )
    .with_readiness(Arc::new(PgReadiness::new(store)));

    Ok(state)
}
