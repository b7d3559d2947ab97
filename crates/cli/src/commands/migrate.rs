//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ac-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CONSOLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migrations live in `crates/console/migrations/` and are embedded in the
//! console library.

use secrecy::SecretString;

use arioncomply_console::db::{MIGRATOR, create_pool};

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the console migrations.
///
/// # Errors
///
/// Returns an error if no database URL is set, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CONSOLE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("CONSOLE_DATABASE_URL"))?;

    tracing::info!("Connecting to console database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Running console migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Console migrations complete!");
    Ok(())
}
