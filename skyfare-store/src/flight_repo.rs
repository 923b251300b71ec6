use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use skyfare_core::flight::{CityIndex, Flight, FlightQuery, SortOrder, SEARCH_LIMIT};
use skyfare_core::store::FlightStore;
use skyfare_core::StoreError;

use crate::store_error;

pub struct PostgresFlightStore {
    pool: PgPool,
}

impl PostgresFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_code: String,
    airline: String,
    departure_city: String,
    arrival_city: String,
    departure_time: String,
    arrival_time: String,
    base_price: i64,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_code: row.flight_code,
            airline: row.airline,
            departure_city: row.departure_city,
            arrival_city: row.arrival_city,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            base_price: row.base_price,
        }
    }
}

const FLIGHT_COLUMNS: &str = "id, flight_code, airline, departure_city, arrival_city, departure_time, arrival_time, base_price";

#[async_trait]
impl FlightStore for PostgresFlightStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Flight::from))
    }

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE TRUE"
        ));

        if let Some(city) = &query.departure_city {
            qb.push(" AND departure_city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }
        if let Some(city) = &query.arrival_city {
            qb.push(" AND arrival_city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }

        // Sort column comes from the whitelist enum, never from raw input.
        qb.push(" ORDER BY ");
        qb.push(query.sort_by.column());
        qb.push(match query.sort_order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
        qb.push(" LIMIT ");
        qb.push_bind(SEARCH_LIMIT as i64);

        let rows = qb
            .build_query_as::<FlightRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn distinct_cities(&self) -> Result<CityIndex, StoreError> {
        let departure_cities: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT departure_city FROM flights ORDER BY departure_city",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let arrival_cities: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT arrival_city FROM flights ORDER BY arrival_city",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(CityIndex { departure_cities, arrival_cities })
    }

    async fn attempts(&self, flight_id: Uuid) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let rows = sqlx::query(
            "SELECT attempted_at FROM booking_attempts WHERE flight_id = $1 ORDER BY attempted_at",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(|row| row.try_get("attempted_at").map_err(store_error))
            .collect()
    }

    async fn prune_attempts(&self, flight_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM booking_attempts WHERE flight_id = $1 AND attempted_at < $2",
        )
        .bind(flight_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn append_attempt(&self, flight_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        // Single INSERT: concurrent appends cannot lose each other, unlike
        // a fetch-mutate-save of an embedded attempt list.
        sqlx::query("INSERT INTO booking_attempts (flight_id, attempted_at) VALUES ($1, $2)")
            .bind(flight_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| match store_error(e) {
                StoreError::NotFound(_) => StoreError::NotFound("flight"),
                other => other,
            })?;
        Ok(())
    }
}
