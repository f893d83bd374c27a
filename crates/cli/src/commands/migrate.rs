//! Server database migrations.
//!
//! # Usage
//!
//! ```bash
//! booksearch migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSEARCH_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time. The server never applies them itself.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Errors from [`run`].
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply pending server migrations.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the connection fails, or a
/// migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BOOKSEARCH_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("BOOKSEARCH_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;
    pool.close().await;

    #[allow(clippy::print_stdout)]
    {
        println!("Migrations complete.");
    }
    Ok(())
}
