use std::sync::Arc;

use transit_core::User;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::BookingDetail;
use crate::repository::{ReservationRepository, ReserveError};

/// The reservation core. Callers reaching this point carry a resolved,
/// authenticated identity; the service commits the seat claim through the
/// repository's serialized gate and reports the outcome.
pub struct ReservationService {
    repo: Arc<dyn ReservationRepository>,
}

impl ReservationService {
    pub fn new(repo: Arc<dyn ReservationRepository>) -> Self {
        Self { repo }
    }

    /// Reserve `seat_id` for `caller`. Exactly one of any set of concurrent
    /// calls on the same seat succeeds; losers get `SeatAlreadyBooked`, a
    /// missing seat gets `SeatNotFound`, and neither mutates any state.
    pub async fn reserve(
        &self,
        caller: &User,
        seat_id: Uuid,
    ) -> Result<BookingDetail, ReserveError> {
        match self.repo.reserve_seat(caller, seat_id).await {
            Ok(detail) => {
                info!(
                    booking_id = %detail.id,
                    user = %caller.username,
                    seat = %detail.seat.seat_number,
                    "Seat reserved"
                );
                Ok(detail)
            }
            Err(ReserveError::SeatAlreadyBooked(id)) => {
                warn!(seat_id = %id, user = %caller.username, "Reservation lost the seat gate");
                Err(ReserveError::SeatAlreadyBooked(id))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetail>, Box<dyn std::error::Error + Send + Sync>> {
        self.repo.bookings_for_user(user_id).await
    }
}
