use async_trait::async_trait;
use uuid::Uuid;

use crate::bus::{Bus, BusUpdate, NewBus};
use crate::seat::Seat;

/// Storage contract for buses and their seats.
///
/// `create_bus` also materializes the seat rows for the requested capacity.
/// Deleting a bus cascades to its seats and any bookings referencing them.
/// Seats are read and flipped, never created or destroyed, by everything else.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn create_bus(
        &self,
        bus: &NewBus,
    ) -> Result<Bus, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_buses(&self) -> Result<Vec<Bus>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_bus(
        &self,
        id: Uuid,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>>;

    /// Apply a partial update. Returns `None` when the bus does not exist.
    async fn update_bus(
        &self,
        id: Uuid,
        update: &BusUpdate,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns whether a bus was actually deleted.
    async fn delete_bus(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_seat(
        &self,
        id: Uuid,
    ) -> Result<Option<Seat>, Box<dyn std::error::Error + Send + Sync>>;

    /// Seats in cabin order.
    async fn seats_for_bus(
        &self,
        bus_id: Uuid,
    ) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>>;
}
