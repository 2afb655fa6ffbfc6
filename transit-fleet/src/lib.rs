pub mod bus;
pub mod repository;
pub mod seat;

pub use bus::{Bus, BusUpdate, FleetError, NewBus};
pub use repository::InventoryRepository;
pub use seat::{seat_labels, Seat, SEATS_PER_ROW};
