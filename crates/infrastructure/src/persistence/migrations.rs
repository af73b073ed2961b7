//! Database migrations
//!
//! Schema changes are embedded here and applied in order. The applied
//! version is tracked in `schema_version`.
//!
//! ## Adding New Migrations
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a `migrate_vX` function
//! 3. Call it from `run_migrations`

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
///
/// # Errors
///
/// Returns an error if any migration step fails.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = schema_version(conn)?;

    if current_version >= SCHEMA_VERSION {
        debug!(version = current_version, "Database schema is up to date");
        return Ok(());
    }

    info!(
        from_version = current_version,
        to_version = SCHEMA_VERSION,
        "Running database migrations"
    );

    if current_version < 1 {
        if let Err(e) = migrate_v1(conn) {
            error!(version = 1, error = %e, "Migration V001 (addresses and featured trips) failed");
            return Err(e);
        }
    }

    if current_version < 2 {
        if let Err(e) = migrate_v2(conn) {
            error!(version = 2, error = %e, "Migration V002 (tariff snapshots) failed");
            return Err(e);
        }
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    info!(version = SCHEMA_VERSION, "Database migrations complete");
    Ok(())
}

/// Currently applied schema version, 0 for a fresh database
///
/// # Errors
///
/// Returns an error if the version table cannot be created or read.
pub fn schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: addresses and featured trips");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS addresses (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            street TEXT,
            street_number TEXT,
            postcode TEXT,
            city TEXT,
            country TEXT,
            lat REAL,
            lng REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS featured_trips (
            id TEXT PRIMARY KEY,
            pickup_label TEXT NOT NULL,
            pickup_address_id TEXT,
            summary_price_cents INTEGER,
            published INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS featured_pois (
            id TEXT PRIMARY KEY,
            trip_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            label TEXT NOT NULL,
            dropoff_address_id TEXT,
            distance_km REAL,
            duration_minutes REAL,
            price_cents INTEGER,
            FOREIGN KEY (trip_id) REFERENCES featured_trips(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_featured_trips_published ON featured_trips(published);
        CREATE INDEX IF NOT EXISTS idx_featured_pois_trip ON featured_pois(trip_id, position);
        ",
    )?;

    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V002: tariff snapshots");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tariff_snapshots (
            version INTEGER PRIMARY KEY,
            config TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(Result::ok)
            .collect()
    }

    #[test]
    fn run_migrations_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables = table_names(&conn);
        for table in ["addresses", "featured_trips", "featured_pois", "tariff_snapshots"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn upgrades_from_version_one() {
        let conn = Connection::open_in_memory().unwrap();
        schema_version(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        set_schema_version(&conn, 1).unwrap();

        run_migrations(&conn).unwrap();
        assert!(table_names(&conn).contains(&"tariff_snapshots".to_string()));
    }
}
