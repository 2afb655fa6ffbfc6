use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use transit_booking::{BookingDetail, ReservationRepository, ReserveError};
use transit_core::User;
use transit_fleet::Seat;
use uuid::Uuid;

use crate::bus_repo::SeatRow;

pub struct PostgresReservationRepository {
    pool: PgPool,
}

impl PostgresReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(err: sqlx::Error) -> ReserveError {
    ReserveError::Store(err.into())
}

#[derive(sqlx::FromRow)]
struct BookingDetailRow {
    id: Uuid,
    booking_time: DateTime<Utc>,
    username: String,
    bus_name: String,
    bus_number: String,
    seat_id: Uuid,
    bus_id: Uuid,
    seat_number: String,
    is_booked: bool,
}

impl From<BookingDetailRow> for BookingDetail {
    fn from(row: BookingDetailRow) -> Self {
        BookingDetail {
            id: row.id,
            user: row.username,
            bus: format!("{} - {}", row.bus_name, row.bus_number),
            seat: Seat {
                id: row.seat_id,
                bus_id: row.bus_id,
                seat_number: row.seat_number,
                is_booked: row.is_booked,
            },
            booking_time: row.booking_time,
        }
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn reserve_seat(
        &self,
        caller: &User,
        seat_id: Uuid,
    ) -> Result<BookingDetail, ReserveError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // The gate: a conditional update only one concurrent caller can win.
        let claimed =
            sqlx::query("UPDATE seats SET is_booked = TRUE WHERE id = $1 AND is_booked = FALSE")
                .bind(seat_id)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;

        if claimed.rows_affected() == 0 {
            // Lost the gate, or no such seat. Tell them apart before rolling back.
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM seats WHERE id = $1)")
                    .bind(seat_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(store_err)?;

            return Err(if exists {
                ReserveError::SeatAlreadyBooked(seat_id)
            } else {
                ReserveError::SeatNotFound(seat_id)
            });
        }

        let seat: SeatRow =
            sqlx::query_as("SELECT id, bus_id, seat_number, is_booked FROM seats WHERE id = $1")
                .bind(seat_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;

        let (bus_name, bus_number): (String, String) =
            sqlx::query_as("SELECT bus_name, bus_number FROM buses WHERE id = $1")
                .bind(seat.bus_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;

        let booking_id = Uuid::new_v4();
        let booking_time = Utc::now();

        sqlx::query(
            "INSERT INTO bookings (id, user_id, bus_id, seat_id, booking_time) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(booking_id)
        .bind(caller.id)
        .bind(seat.bus_id)
        .bind(seat_id)
        .bind(booking_time)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        // Flag flip and booking row land together or not at all.
        tx.commit().await.map_err(store_err)?;

        Ok(BookingDetail {
            id: booking_id,
            user: caller.username.clone(),
            bus: format!("{} - {}", bus_name, bus_number),
            seat: Seat::from(seat),
            booking_time,
        })
    }

    async fn bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingDetailRow> = sqlx::query_as(
            "SELECT b.id, b.booking_time, u.username, bu.bus_name, bu.bus_number, \
             s.id AS seat_id, s.bus_id, s.seat_number, s.is_booked \
             FROM bookings b \
             JOIN users u ON b.user_id = u.id \
             JOIN buses bu ON b.bus_id = bu.id \
             JOIN seats s ON b.seat_id = s.id \
             WHERE b.user_id = $1 \
             ORDER BY b.booking_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookingDetail::from).collect())
    }
}
