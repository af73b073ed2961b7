//! File-backed persistence tests

use application::ports::{FeaturedTripStore, TariffConfigStore};
use domain::{FeaturedPoi, FeaturedTrip, TariffConfig};
use infrastructure::{
    DatabaseConfig, create_pool,
    persistence::{SqliteFeaturedTripStore, SqliteTariffStore, migrations},
};
use std::sync::Arc;

fn file_config(dir: &tempfile::TempDir) -> DatabaseConfig {
    DatabaseConfig {
        path: dir.path().join("data/taxifare.db").to_string_lossy().into_owned(),
        max_connections: 2,
        run_migrations: true,
    }
}

#[tokio::test]
async fn data_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let trip = FeaturedTrip::new("Aéroport Lyon-Saint Exupéry")
        .with_poi(FeaturedPoi::new("Gare Part-Dieu"))
        .with_poi(FeaturedPoi::new("Vieux Lyon"));

    {
        let pool = Arc::new(create_pool(&file_config(&dir)).unwrap());
        let trips = SqliteFeaturedTripStore::new(Arc::clone(&pool));
        trips.upsert(&trip).await.unwrap();

        let tariffs = SqliteTariffStore::new(pool, TariffConfig::default());
        let mut changed = TariffConfig::default();
        changed.baggage_fee_cents = 300;
        tariffs.save(&changed).await.unwrap();
    }

    let pool = Arc::new(create_pool(&file_config(&dir)).unwrap());
    let conn = pool.get().unwrap();
    assert_eq!(migrations::schema_version(&conn).unwrap(), migrations::SCHEMA_VERSION);
    drop(conn);

    let trips = SqliteFeaturedTripStore::new(Arc::clone(&pool));
    let stored = trips.get(trip.id).await.unwrap().unwrap();
    let labels: Vec<_> = stored
        .poi_destinations
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, ["Gare Part-Dieu", "Vieux Lyon"]);

    let tariffs = SqliteTariffStore::new(pool, TariffConfig::default());
    let current = tariffs.current().await.unwrap();
    assert_eq!(current.version, 1);
    assert_eq!(current.config.baggage_fee_cents, 300);
}
