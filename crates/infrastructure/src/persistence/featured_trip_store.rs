//! SQLite-based featured trip persistence

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{FeaturedTripStore, PoiQuoteUpdate},
};
use async_trait::async_trait;
use domain::entities::{FeaturedPoi, FeaturedTrip};
use domain::value_objects::{AddressId, FeaturedTripId, PoiId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;
use super::internal;

/// SQLite-based featured trip store
#[derive(Debug, Clone)]
pub struct SqliteFeaturedTripStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteFeaturedTripStore {
    /// Create a new SQLite featured trip store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    async fn execute_one(
        &self,
        sql: &'static str,
        args: Vec<rusqlite::types::Value>,
        what: String,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let changed = conn
                .execute(sql, rusqlite::params_from_iter(args))
                .map_err(internal)?;
            if changed == 0 {
                return Err(ApplicationError::NotFound(what));
            }
            Ok(())
        })
        .await
        .map_err(internal)?
    }
}

#[async_trait]
impl FeaturedTripStore for SqliteFeaturedTripStore {
    #[instrument(skip(self))]
    async fn list_published(&self) -> Result<Vec<FeaturedTrip>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, pickup_label, pickup_address_id, summary_price_cents, published
                     FROM featured_trips WHERE published = 1 ORDER BY rowid",
                )
                .map_err(internal)?;

            let mut trips = stmt
                .query_map([], row_to_trip)
                .map_err(internal)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal)?;

            for trip in &mut trips {
                trip.poi_destinations = load_pois(&conn, trip.id).map_err(internal)?;
            }

            debug!(count = trips.len(), "Loaded published featured trips");
            Ok(trips)
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self), fields(trip_id = %id))]
    async fn get(&self, id: FeaturedTripId) -> Result<Option<FeaturedTrip>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let trip = conn
                .query_row(
                    "SELECT id, pickup_label, pickup_address_id, summary_price_cents, published
                     FROM featured_trips WHERE id = ?1",
                    [id.to_string()],
                    row_to_trip,
                )
                .optional()
                .map_err(internal)?;

            match trip {
                Some(mut trip) => {
                    trip.poi_destinations = load_pois(&conn, trip.id).map_err(internal)?;
                    Ok(Some(trip))
                },
                None => Ok(None),
            }
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self, trip), fields(trip_id = %trip.id))]
    async fn upsert(&self, trip: &FeaturedTrip) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let trip = trip.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(internal)?;
            let tx = conn.transaction().map_err(internal)?;

            tx.execute(
                "INSERT INTO featured_trips (id, pickup_label, pickup_address_id, summary_price_cents, published)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    pickup_label = excluded.pickup_label,
                    pickup_address_id = excluded.pickup_address_id,
                    summary_price_cents = excluded.summary_price_cents,
                    published = excluded.published",
                params![
                    trip.id.to_string(),
                    trip.pickup_label,
                    trip.pickup_address_id.map(|a| a.to_string()),
                    trip.summary_price_cents,
                    trip.published,
                ],
            )
            .map_err(internal)?;

            tx.execute(
                "DELETE FROM featured_pois WHERE trip_id = ?1",
                [trip.id.to_string()],
            )
            .map_err(internal)?;

            for (position, poi) in trip.poi_destinations.iter().enumerate() {
                tx.execute(
                    "INSERT INTO featured_pois (
                        id, trip_id, position, label, dropoff_address_id,
                        distance_km, duration_minutes, price_cents
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        poi.id.to_string(),
                        trip.id.to_string(),
                        i64::try_from(position).unwrap_or(i64::MAX),
                        poi.label,
                        poi.dropoff_address_id.map(|a| a.to_string()),
                        poi.distance_km,
                        poi.duration_minutes,
                        poi.price_cents,
                    ],
                )
                .map_err(internal)?;
            }

            tx.commit().map_err(internal)?;
            debug!(pois = trip.poi_destinations.len(), "Upserted featured trip");
            Ok(())
        })
        .await
        .map_err(internal)?
    }

    async fn set_pickup_address(
        &self,
        trip_id: FeaturedTripId,
        address_id: AddressId,
    ) -> Result<(), ApplicationError> {
        self.execute_one(
            "UPDATE featured_trips SET pickup_address_id = ?2 WHERE id = ?1",
            vec![trip_id.to_string().into(), address_id.to_string().into()],
            format!("featured trip {trip_id}"),
        )
        .await
    }

    async fn set_poi_dropoff_address(
        &self,
        poi_id: PoiId,
        address_id: AddressId,
    ) -> Result<(), ApplicationError> {
        self.execute_one(
            "UPDATE featured_pois SET dropoff_address_id = ?2 WHERE id = ?1",
            vec![poi_id.to_string().into(), address_id.to_string().into()],
            format!("featured destination {poi_id}"),
        )
        .await
    }

    async fn update_poi_quote(
        &self,
        poi_id: PoiId,
        update: PoiQuoteUpdate,
    ) -> Result<(), ApplicationError> {
        self.execute_one(
            "UPDATE featured_pois
             SET distance_km = ?2, duration_minutes = ?3, price_cents = ?4
             WHERE id = ?1",
            vec![
                poi_id.to_string().into(),
                update.distance_km.into(),
                update.duration_minutes.into(),
                update.price_cents.into(),
            ],
            format!("featured destination {poi_id}"),
        )
        .await
    }

    async fn update_trip_summary_price(
        &self,
        trip_id: FeaturedTripId,
        price_cents: i64,
    ) -> Result<(), ApplicationError> {
        self.execute_one(
            "UPDATE featured_trips SET summary_price_cents = ?2 WHERE id = ?1",
            vec![trip_id.to_string().into(), price_cents.into()],
            format!("featured trip {trip_id}"),
        )
        .await
    }
}

fn load_pois(conn: &Connection, trip_id: FeaturedTripId) -> rusqlite::Result<Vec<FeaturedPoi>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, dropoff_address_id, distance_km, duration_minutes, price_cents
         FROM featured_pois WHERE trip_id = ?1 ORDER BY position",
    )?;
    stmt.query_map([trip_id.to_string()], row_to_poi)?
        .collect()
}

fn conversion_error(index: usize, e: uuid::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
}

fn optional_address_id(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<AddressId>> {
    let raw: Option<String> = row.get(index)?;
    raw.map(|s| AddressId::parse(&s).map_err(|e| conversion_error(index, e)))
        .transpose()
}

fn row_to_trip(row: &Row<'_>) -> rusqlite::Result<FeaturedTrip> {
    let id: String = row.get(0)?;
    Ok(FeaturedTrip {
        id: FeaturedTripId::parse(&id).map_err(|e| conversion_error(0, e))?,
        pickup_label: row.get(1)?,
        pickup_address_id: optional_address_id(row, 2)?,
        poi_destinations: Vec::new(),
        summary_price_cents: row.get(3)?,
        published: row.get(4)?,
    })
}

fn row_to_poi(row: &Row<'_>) -> rusqlite::Result<FeaturedPoi> {
    let id: String = row.get(0)?;
    Ok(FeaturedPoi {
        id: PoiId::parse(&id).map_err(|e| conversion_error(0, e))?,
        label: row.get(1)?,
        dropoff_address_id: optional_address_id(row, 2)?,
        distance_km: row.get(3)?,
        duration_minutes: row.get(4)?,
        price_cents: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::persistence::create_pool;

    fn store() -> SqliteFeaturedTripStore {
        let pool = create_pool(&DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: true,
        })
        .unwrap();
        SqliteFeaturedTripStore::new(Arc::new(pool))
    }

    fn airport_trip() -> FeaturedTrip {
        FeaturedTrip::new("Aéroport Lyon-Saint Exupéry")
            .with_poi(FeaturedPoi::new("Place Bellecour, Lyon"))
            .with_poi(FeaturedPoi::new("Gare de Lyon Part-Dieu"))
    }

    #[tokio::test]
    async fn upsert_and_get_preserves_poi_order() {
        let store = store();
        let trip = airport_trip();

        store.upsert(&trip).await.unwrap();
        let loaded = store.get(trip.id).await.unwrap().unwrap();

        assert_eq!(loaded, trip);
    }

    #[tokio::test]
    async fn list_published_skips_drafts() {
        let store = store();
        let published = airport_trip();
        let mut draft = FeaturedTrip::new("Gare de Grenoble");
        draft.published = false;

        store.upsert(&published).await.unwrap();
        store.upsert(&draft).await.unwrap();

        let trips = store.list_published().await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, published.id);
        assert_eq!(trips[0].poi_destinations.len(), 2);
    }

    #[tokio::test]
    async fn upsert_replaces_destinations() {
        let store = store();
        let mut trip = airport_trip();
        store.upsert(&trip).await.unwrap();

        trip.poi_destinations.truncate(1);
        trip.pickup_label = "Aéroport LYS".to_string();
        store.upsert(&trip).await.unwrap();

        let loaded = store.get(trip.id).await.unwrap().unwrap();
        assert_eq!(loaded.pickup_label, "Aéroport LYS");
        assert_eq!(loaded.poi_destinations.len(), 1);
    }

    #[tokio::test]
    async fn derived_fields_are_written_back() {
        let store = store();
        let trip = airport_trip();
        store.upsert(&trip).await.unwrap();

        let pickup = AddressId::new();
        let dropoff = AddressId::new();
        let poi_id = trip.poi_destinations[0].id;

        store.set_pickup_address(trip.id, pickup).await.unwrap();
        store.set_poi_dropoff_address(poi_id, dropoff).await.unwrap();
        store
            .update_poi_quote(
                poi_id,
                PoiQuoteUpdate {
                    distance_km: 24.6,
                    duration_minutes: 31.0,
                    price_cents: 6_582,
                },
            )
            .await
            .unwrap();
        store.update_trip_summary_price(trip.id, 6_582).await.unwrap();

        let loaded = store.get(trip.id).await.unwrap().unwrap();
        assert_eq!(loaded.pickup_address_id, Some(pickup));
        assert_eq!(loaded.summary_price_cents, Some(6_582));
        let poi = &loaded.poi_destinations[0];
        assert_eq!(poi.dropoff_address_id, Some(dropoff));
        assert_eq!(poi.price_cents, Some(6_582));
        assert_eq!(poi.distance_km, Some(24.6));
    }

    #[tokio::test]
    async fn updates_on_unknown_ids_are_not_found() {
        let store = store();
        let err = store
            .update_trip_summary_price(FeaturedTripId::new(), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));

        let err = store
            .set_poi_dropoff_address(PoiId::new(), AddressId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }
}
