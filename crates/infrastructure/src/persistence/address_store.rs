//! SQLite-based address persistence

use std::sync::Arc;

use application::{error::ApplicationError, ports::AddressStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Address;
use domain::value_objects::{AddressId, Coordinate};
use rusqlite::{OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;
use super::internal;

/// SQLite-based address store
#[derive(Debug, Clone)]
pub struct SqliteAddressStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteAddressStore {
    /// Create a new SQLite address store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressStore for SqliteAddressStore {
    #[instrument(skip(self), fields(address_id = %id))]
    async fn get(&self, id: AddressId) -> Result<Option<Address>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            conn.query_row(
                "SELECT id, label, street, street_number, postcode, city, country,
                        lat, lng, created_at, updated_at
                 FROM addresses WHERE id = ?1",
                [id.to_string()],
                row_to_address,
            )
            .optional()
            .map_err(internal)
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self, address), fields(address_id = %address.id))]
    async fn create(&self, address: &Address) -> Result<Address, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let address = address.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let (lat, lng) = address
                .coordinate
                .map_or((None, None), |c| (Some(c.lat()), Some(c.lng())));

            conn.execute(
                "INSERT INTO addresses (
                    id, label, street, street_number, postcode, city, country,
                    lat, lng, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    address.id.to_string(),
                    address.label,
                    address.street,
                    address.street_number,
                    address.postcode,
                    address.city,
                    address.country,
                    lat,
                    lng,
                    address.created_at.to_rfc3339(),
                    address.updated_at.to_rfc3339(),
                ],
            )
            .map_err(internal)?;

            debug!("Created address");
            Ok(address)
        })
        .await
        .map_err(internal)?
    }

    #[instrument(skip(self), fields(address_id = %id))]
    async fn update_coordinates(
        &self,
        id: AddressId,
        coordinate: Coordinate,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(internal)?;
            let changed = conn
                .execute(
                    "UPDATE addresses SET lat = ?2, lng = ?3, updated_at = ?4 WHERE id = ?1",
                    params![
                        id.to_string(),
                        coordinate.lat(),
                        coordinate.lng(),
                        Utc::now().to_rfc3339()
                    ],
                )
                .map_err(internal)?;

            if changed == 0 {
                return Err(ApplicationError::NotFound(format!("address {id}")));
            }
            Ok(())
        })
        .await
        .map_err(internal)?
    }
}

fn row_to_address(row: &Row<'_>) -> rusqlite::Result<Address> {
    let id_str: String = row.get(0)?;
    let lat: Option<f64> = row.get(7)?;
    let lng: Option<f64> = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    let id = AddressId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Address {
        id,
        label: row.get(1)?,
        street: row.get(2)?,
        street_number: row.get(3)?,
        postcode: row.get(4)?,
        city: row.get(5)?,
        country: row.get(6)?,
        coordinate: lat.zip(lng).map(|(lat, lng)| Coordinate::new_unchecked(lat, lng)),
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
