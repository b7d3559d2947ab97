//! Session middleware configuration.
//!
//! Sessions are stored in `PostgreSQL` when the console has a database and
//! in process memory otherwise.

use sqlx::PgPool;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ConsoleConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "arioncomply_console_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with the `PostgreSQL` store.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "console" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ConsoleConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The session table is created by the console migrations.
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("console")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    configure(SessionManagerLayer::new(store), config)
}

/// Create the session layer with the in-memory store.
#[must_use]
pub fn create_memory_session_layer(config: &ConsoleConfig) -> SessionManagerLayer<MemoryStore> {
    configure(SessionManagerLayer::new(MemoryStore::default()), config)
}

fn configure<S: SessionStore>(
    layer: SessionManagerLayer<S>,
    config: &ConsoleConfig,
) -> SessionManagerLayer<S> {
    layer
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
