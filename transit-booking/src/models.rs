use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transit_fleet::Seat;
use uuid::Uuid;

/// A committed reservation: one user holding one seat on one bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bus_id: Uuid,
    pub seat_id: Uuid,
    pub booking_time: DateTime<Utc>,
}

/// Listing/confirmation view of a booking: user and bus rendered as
/// human-readable references, seat embedded in full.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetail {
    pub id: Uuid,
    pub user: String,
    pub bus: String,
    pub seat: Seat,
    pub booking_time: DateTime<Utc>,
}
