pub mod models;
pub mod repository;
pub mod reservation;

pub use models::{Booking, BookingDetail};
pub use repository::{ReservationRepository, ReserveError};
pub use reservation::ReservationService;
