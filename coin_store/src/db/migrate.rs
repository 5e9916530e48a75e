//! set up migrations

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::{
    db::connection::StoreConnection,
    error::{StoreError, StoreResult},
};

/// Embedded Diesel migrations bundled with this crate.
///
/// These create `coin_data` and `coin_month_data`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs pending migrations on an already open connection.
pub fn run_pending(conn: &mut StoreConnection) -> StoreResult<()> {
    let applied = match conn {
        StoreConnection::Sqlite(c) => c.run_pending_migrations(MIGRATIONS).map(|v| v.len()),
        #[cfg(feature = "postgres")]
        StoreConnection::Postgres(c) => c.run_pending_migrations(MIGRATIONS).map(|v| v.len()),
    }
    .map_err(StoreError::Migration)?;

    if applied > 0 {
        tracing::info!(applied, "applied store migrations");
    }
    Ok(())
}

/// Opens `database_url` and runs pending migrations on it.
pub fn run_all(database_url: &str) -> StoreResult<()> {
    let mut conn = StoreConnection::establish(database_url)?;
    run_pending(&mut conn)
}
