//! Diesel/PostgreSQL persistence adapters.

mod account_repository;
mod listing_repository;
mod models;
mod pool;
mod schema;

pub use account_repository::DieselAccountRepository;
pub use listing_repository::DieselListingRepository;
pub use pool::{DbPool, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// SQL migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while bringing the schema up to date at startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be established.
    #[error("migration connection failed: {message}")]
    Connect {
        /// Underlying failure detail.
        message: String,
    },
    /// A migration failed to apply.
    #[error("migration failed: {message}")]
    Run {
        /// Underlying failure detail.
        message: String,
    },
}

/// Run any pending migrations over a short-lived synchronous connection.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|connect_error| {
        MigrationError::Connect {
            message: connect_error.to_string(),
        }
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|run_error| MigrationError::Run {
            message: run_error.to_string(),
        })?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}
