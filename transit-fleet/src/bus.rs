use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seat::max_seat_count;

/// A scheduled bus on a fixed route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub id: Uuid,
    pub bus_name: String,
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    pub features: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub no_of_seats: i32,
    pub price_amount: i32,
    pub price_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bus {
    /// Human-readable reference used in booking listings.
    pub fn label(&self) -> String {
        format!("{} - {}", self.bus_name, self.bus_number)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FleetError {
    #[error("Invalid bus: {0}")]
    InvalidBus(String),
}

/// Fields required to register a bus. Seats are generated from
/// `no_of_seats` at creation and never regenerated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBus {
    pub bus_name: String,
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    pub features: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub no_of_seats: i32,
    pub price_amount: i32,
    pub price_currency: String,
}

impl NewBus {
    pub fn validate(&self) -> Result<(), FleetError> {
        if self.bus_name.trim().is_empty() {
            return Err(FleetError::InvalidBus("bus_name must not be empty".into()));
        }
        if self.bus_number.trim().is_empty() {
            return Err(FleetError::InvalidBus("bus_number must not be empty".into()));
        }
        if self.no_of_seats < 1 || self.no_of_seats > max_seat_count() {
            return Err(FleetError::InvalidBus(format!(
                "no_of_seats must be between 1 and {}",
                max_seat_count()
            )));
        }
        if self.price_amount < 0 {
            return Err(FleetError::InvalidBus("price_amount must not be negative".into()));
        }
        Ok(())
    }
}

/// Partial update for a bus. `None` fields are left untouched. Seat count is
/// deliberately absent: the seat map is fixed once generated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusUpdate {
    pub bus_name: Option<String>,
    pub bus_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub features: Option<String>,
    pub departure_time: Option<NaiveTime>,
    pub arrival_time: Option<NaiveTime>,
    pub price_amount: Option<i32>,
    pub price_currency: Option<String>,
}

impl BusUpdate {
    /// Apply the populated fields to `bus` and stamp `updated_at`.
    pub fn apply(&self, bus: &mut Bus, now: DateTime<Utc>) {
        if let Some(v) = &self.bus_name {
            bus.bus_name = v.clone();
        }
        if let Some(v) = &self.bus_number {
            bus.bus_number = v.clone();
        }
        if let Some(v) = &self.origin {
            bus.origin = v.clone();
        }
        if let Some(v) = &self.destination {
            bus.destination = v.clone();
        }
        if let Some(v) = &self.features {
            bus.features = v.clone();
        }
        if let Some(v) = self.departure_time {
            bus.departure_time = v;
        }
        if let Some(v) = self.arrival_time {
            bus.arrival_time = v;
        }
        if let Some(v) = self.price_amount {
            bus.price_amount = v;
        }
        if let Some(v) = &self.price_currency {
            bus.price_currency = v.clone();
        }
        bus.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewBus {
        NewBus {
            bus_name: "Express 101".to_string(),
            bus_number: "KA-01-1234".to_string(),
            origin: "Bengaluru".to_string(),
            destination: "Mysuru".to_string(),
            features: "AC, WiFi".to_string(),
            departure_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            no_of_seats: 40,
            price_amount: 45000,
            price_currency: "INR".to_string(),
        }
    }

    #[test]
    fn valid_bus_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_number_rejected() {
        let mut bus = sample();
        bus.bus_number = "  ".to_string();
        assert!(bus.validate().is_err());
    }

    #[test]
    fn seat_count_bounds_enforced() {
        let mut bus = sample();
        bus.no_of_seats = 0;
        assert!(bus.validate().is_err());
        bus.no_of_seats = max_seat_count() + 1;
        assert!(bus.validate().is_err());
        bus.no_of_seats = max_seat_count();
        assert!(bus.validate().is_ok());
    }

    #[test]
    fn update_applies_only_populated_fields() {
        let new_bus = sample();
        let now = Utc::now();
        let mut bus = Bus {
            id: Uuid::new_v4(),
            bus_name: new_bus.bus_name,
            bus_number: new_bus.bus_number,
            origin: new_bus.origin,
            destination: new_bus.destination,
            features: new_bus.features,
            departure_time: new_bus.departure_time,
            arrival_time: new_bus.arrival_time,
            no_of_seats: new_bus.no_of_seats,
            price_amount: new_bus.price_amount,
            price_currency: new_bus.price_currency,
            created_at: now,
            updated_at: now,
        };

        let update = BusUpdate {
            origin: Some("Chennai".to_string()),
            price_amount: Some(52000),
            ..BusUpdate::default()
        };
        let later = now + chrono::Duration::seconds(5);
        update.apply(&mut bus, later);

        assert_eq!(bus.origin, "Chennai");
        assert_eq!(bus.price_amount, 52000);
        assert_eq!(bus.destination, "Mysuru");
        assert_eq!(bus.no_of_seats, 40);
        assert_eq!(bus.updated_at, later);
    }
}
