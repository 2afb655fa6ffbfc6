use std::sync::Arc;

use transit_booking::ReservationService;
use transit_core::IdentityRepository;
use transit_fleet::InventoryRepository;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<dyn InventoryRepository>,
    pub identity: Arc<dyn IdentityRepository>,
    pub reservations: Arc<ReservationService>,
    pub auth: AuthConfig,
}
