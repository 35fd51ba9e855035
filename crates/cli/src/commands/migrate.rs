//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ff-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FARMFRESH_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time. The in-memory store (`memory://`) has no schema and is rejected.

use secrecy::ExposeSecret;
use tracing::info;

use farm_fresh_api::db::{self, MEMORY_DATABASE_URL};

/// Run the document store migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, points at the in-memory
/// store, or the migrations fail.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    if database_url.expose_secret() == MEMORY_DATABASE_URL {
        return Err("the in-memory store has no migrations to run".into());
    }

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
