pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

/// Opens the booking store at `path` (`:memory:` for tests) and brings the
/// schema up to date.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open booking store at {path}"))?;

    // Bookings reference services, so the FK must be enforced per connection.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set booking store pragmas")?;

    migrations::run_migrations(&conn)?;

    tracing::debug!(path, "booking store ready");
    Ok(conn)
}
