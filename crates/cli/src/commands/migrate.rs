//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! canteen-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CANTEEN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migration files live in `crates/server/migrations/`.

use super::{CommandError, connect};

/// Run server database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running canteen migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
