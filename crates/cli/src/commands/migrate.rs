//! Database migration command.
//!
//! Migration files live in `crates/admin/migrations/` and are embedded into
//! the binary, so the CLI can migrate any environment it can reach.

use tracing::info;

use super::CommandError;

/// Run the admin database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
