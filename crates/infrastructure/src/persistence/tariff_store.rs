//! SQLite-based tariff snapshot persistence
//!
//! Snapshots are append-only. `version` doubles as the SQLite rowid, so the
//! next version is assigned inside the `INSERT` itself.

use std::sync::Arc;

use application::{error::ApplicationError, ports::TariffConfigStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::value_objects::{TariffConfig, TariffSnapshot};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, info, instrument};

use super::connection::ConnectionPool;
use super::internal;

/// SQLite-based tariff configuration store
#[derive(Debug, Clone)]
pub struct SqliteTariffStore {
    pool: Arc<ConnectionPool>,
    seed: TariffConfig,
}

impl SqliteTariffStore {
    /// Create a store that seeds an empty table with `seed`
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>, seed: TariffConfig) -> Self {
        Self { pool, seed }
    }
}

fn latest(conn: &Connection) -> rusqlite::Result<Option<TariffSnapshot>> {
    conn.query_row(
        "SELECT version, config, updated_at FROM tariff_snapshots
         ORDER BY version DESC LIMIT 1",
        [],
        row_to_snapshot,
    )
    .optional()
}

fn insert_next(conn: &Connection, config: &TariffConfig) -> Result<TariffSnapshot, ApplicationError> {
    let json = serde_json::to_string(config).map_err(internal)?;
    let updated_at = Utc::now();

    conn.execute(
        "INSERT INTO tariff_snapshots (version, config, updated_at)
         SELECT COALESCE(MAX(version), 0) + 1, ?1, ?2 FROM tariff_snapshots",
        params![json, updated_at.to_rfc3339()],
    )
    .map_err(internal)?;

    let version = u64::try_from(conn.last_insert_rowid()).map_err(internal)?;
    Ok(TariffSnapshot {
        version,
        config: *config,
        updated_at,
    })
}

#[async_trait]
impl TariffConfigStore for SqliteTariffStore {
    #[instrument(skip(self))]
    async fn current(&self) -> Result<TariffSnapshot, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let seed = self.seed;

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            if let Some(snapshot) = latest(&conn).map_err(internal)? {
                return Ok(snapshot);
            }

            info!("Tariff store empty, seeding default configuration");
            insert_next(&conn, &seed)
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self, config))]
    async fn save(&self, config: &TariffConfig) -> Result<TariffSnapshot, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let config = *config;

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let snapshot = insert_next(&conn, &config)?;
            debug!(version = snapshot.version, "Saved tariff snapshot");
            Ok(snapshot)
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self))]
    async fn history(&self, limit: u32) -> Result<Vec<TariffSnapshot>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let mut stmt = conn
                .prepare(
                    "SELECT version, config, updated_at FROM tariff_snapshots
                     ORDER BY version DESC LIMIT ?1",
                )
                .map_err(internal)?;

            stmt.query_map([limit], row_to_snapshot)
                .map_err(internal)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal)
        })
        .await
        .map_err(internal)?
    }
}

fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<TariffSnapshot> {
    let version: i64 = row.get(0)?;
    let config_json: String = row.get(1)?;
    let updated_at: String = row.get(2)?;

    let config: TariffConfig = serde_json::from_str(&config_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(TariffSnapshot {
        version: version.unsigned_abs(),
        config,
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
    })
}

#[cfg(test)]
mod tests {
    use domain::value_objects::KmRates;

    use super::*;
    use crate::config::DatabaseConfig;
    use crate::persistence::create_pool;

    fn store() -> SqliteTariffStore {
        let pool = create_pool(&DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: true,
        })
        .unwrap();
        SqliteTariffStore::new(Arc::new(pool), TariffConfig::default())
    }

    fn night_heavy() -> TariffConfig {
        TariffConfig {
            km_cents: KmRates {
                a: 130,
                b: 200,
                c: 260,
                d: 320,
            },
            ..TariffConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_store_is_seeded_once() {
        let store = store();

        let first = store.current().await.unwrap();
        let second = store.current().await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(first.config, TariffConfig::default());
        assert_eq!(second.version, 1);
        assert_eq!(store.history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_increments_version() {
        let store = store();
        store.current().await.unwrap();

        let saved = store.save(&night_heavy()).await.unwrap();
        assert_eq!(saved.version, 2);

        let current = store.current().await.unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.config.km_cents.b, 200);
    }

    #[tokio::test]
    async fn save_on_empty_store_starts_at_one() {
        let store = store();
        let saved = store.save(&night_heavy()).await.unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(store.current().await.unwrap().config, night_heavy());
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let store = store();
        for _ in 0..3 {
            store.save(&night_heavy()).await.unwrap();
        }

        let history = store.history(2).await.unwrap();
        let versions: Vec<u64> = history.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![3, 2]);
    }
}
