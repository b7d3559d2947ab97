//! Database operations for the console `PostgreSQL`.
//!
//! The database is optional. Without one, sessions are kept in memory and
//! the saved-test endpoints answer with a server error.
//!
//! ## Tables (schema `console`)
//!
//! - `compliance_test` - Saved provider comparisons
//! - `session` - HTTP session records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/console/migrations/` and run via:
//! ```bash
//! cargo run -p arioncomply-cli -- migrate
//! ```


use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use compliance_tests::ComplianceTestRepository;

/// Embedded console migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The console was started without a database.
    #[error("database not configured")]
    NotConfigured,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
