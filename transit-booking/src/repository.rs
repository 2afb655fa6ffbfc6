use async_trait::async_trait;
use transit_core::User;
use uuid::Uuid;

use crate::models::BookingDetail;

#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    #[error("Seat not found: {0}")]
    SeatNotFound(Uuid),

    #[error("Seat already booked: {0}")]
    SeatAlreadyBooked(Uuid),

    #[error("Reservation store failure: {0}")]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage contract for the reservation path.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// The seat mutual-exclusion gate. Checks the seat exists and is
    /// unbooked, flips the booked flag, and inserts the booking row as one
    /// serialized unit: under concurrent calls on the same seat exactly one
    /// caller wins and every other caller sees `SeatAlreadyBooked`
    /// immediately. A failed call leaves both stores untouched.
    async fn reserve_seat(
        &self,
        caller: &User,
        seat_id: Uuid,
    ) -> Result<BookingDetail, ReserveError>;

    /// Bookings owned by a user, most recent first.
    async fn bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetail>, Box<dyn std::error::Error + Send + Sync>>;
}
