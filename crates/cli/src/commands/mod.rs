//! CLI subcommand implementations.

pub mod driver;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] terra_verde_admin::db::RepositoryError),

    #[error("Identity error: {0}")]
    Identity(#[from] terra_verde_admin::services::identity::IdentityError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the admin database using `TERRA_DATABASE_URL` (falling back to
/// `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("TERRA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("TERRA_DATABASE_URL"))?;

    let pool = terra_verde_admin::db::create_pool(&database_url).await?;
    Ok(pool)
}
