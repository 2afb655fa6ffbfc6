use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;
use transit_fleet::{seat_labels, Bus, BusUpdate, InventoryRepository, NewBus, Seat};
use uuid::Uuid;

pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    bus_name: String,
    bus_number: String,
    origin: String,
    destination: String,
    features: String,
    departure_time: NaiveTime,
    arrival_time: NaiveTime,
    no_of_seats: i32,
    price_amount: i32,
    price_currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BusRow> for Bus {
    fn from(row: BusRow) -> Self {
        Bus {
            id: row.id,
            bus_name: row.bus_name,
            bus_number: row.bus_number,
            origin: row.origin,
            destination: row.destination,
            features: row.features,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            no_of_seats: row.no_of_seats,
            price_amount: row.price_amount,
            price_currency: row.price_currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SeatRow {
    pub(crate) id: Uuid,
    pub(crate) bus_id: Uuid,
    pub(crate) seat_number: String,
    pub(crate) is_booked: bool,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: row.id,
            bus_id: row.bus_id,
            seat_number: row.seat_number,
            is_booked: row.is_booked,
        }
    }
}

const SELECT_BUS: &str = "SELECT id, bus_name, bus_number, origin, destination, features, \
     departure_time, arrival_time, no_of_seats, price_amount, price_currency, \
     created_at, updated_at FROM buses";

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn create_bus(
        &self,
        bus: &NewBus,
    ) -> Result<Bus, Box<dyn std::error::Error + Send + Sync>> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO buses (id, bus_name, bus_number, origin, destination, features, \
             departure_time, arrival_time, no_of_seats, price_amount, price_currency, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(id)
        .bind(&bus.bus_name)
        .bind(&bus.bus_number)
        .bind(&bus.origin)
        .bind(&bus.destination)
        .bind(&bus.features)
        .bind(bus.departure_time)
        .bind(bus.arrival_time)
        .bind(bus.no_of_seats)
        .bind(bus.price_amount)
        .bind(&bus.price_currency)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for label in seat_labels(bus.no_of_seats) {
            sqlx::query(
                "INSERT INTO seats (id, bus_id, seat_number, is_booked) VALUES ($1, $2, $3, FALSE)",
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(label)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Bus {
            id,
            bus_name: bus.bus_name.clone(),
            bus_number: bus.bus_number.clone(),
            origin: bus.origin.clone(),
            destination: bus.destination.clone(),
            features: bus.features.clone(),
            departure_time: bus.departure_time,
            arrival_time: bus.arrival_time,
            no_of_seats: bus.no_of_seats,
            price_amount: bus.price_amount,
            price_currency: bus.price_currency.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BusRow> = sqlx::query_as(&format!("{} ORDER BY created_at", SELECT_BUS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Bus::from).collect())
    }

    async fn get_bus(
        &self,
        id: Uuid,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BusRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_BUS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Bus::from))
    }

    async fn update_bus(
        &self,
        id: Uuid,
        update: &BusUpdate,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BusRow> = sqlx::query_as(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_BUS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut bus = Bus::from(row);
        update.apply(&mut bus, Utc::now());

        sqlx::query(
            "UPDATE buses SET bus_name = $1, bus_number = $2, origin = $3, destination = $4, \
             features = $5, departure_time = $6, arrival_time = $7, price_amount = $8, \
             price_currency = $9, updated_at = $10 WHERE id = $11",
        )
        .bind(&bus.bus_name)
        .bind(&bus.bus_number)
        .bind(&bus.origin)
        .bind(&bus.destination)
        .bind(&bus.features)
        .bind(bus.departure_time)
        .bind(bus.arrival_time)
        .bind(bus.price_amount)
        .bind(&bus.price_currency)
        .bind(bus.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(bus))
    }

    async fn delete_bus(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Seats and bookings go with the bus via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM buses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_seat(
        &self,
        id: Uuid,
    ) -> Result<Option<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<SeatRow> =
            sqlx::query_as("SELECT id, bus_id, seat_number, is_booked FROM seats WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Seat::from))
    }

    async fn seats_for_bus(
        &self,
        bus_id: Uuid,
    ) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<SeatRow> = sqlx::query_as(
            "SELECT id, bus_id, seat_number, is_booked FROM seats WHERE bus_id = $1 \
             ORDER BY seat_number",
        )
        .bind(bus_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }
}
