use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use transit_booking::{Booking, BookingDetail, ReservationRepository, ReserveError};
use transit_core::{IdentityError, IdentityRepository, User, UserRecord};
use transit_fleet::{seat_labels, Bus, BusUpdate, InventoryRepository, NewBus, Seat};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    buses: HashMap<Uuid, Bus>,
    seats: HashMap<Uuid, Seat>,
    bookings: Vec<Booking>,
    users: HashMap<Uuid, UserRecord>,
}

/// Map-backed store implementing every repository trait. A single mutex
/// spans the whole check-flip-insert reservation unit, making this the
/// reference implementation of the seat gate's single-winner contract.
/// The test suites run against it; deployments use the Postgres repositories.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn create_bus(
        &self,
        bus: &NewBus,
    ) -> Result<Bus, Box<dyn std::error::Error + Send + Sync>> {
        let now = Utc::now();
        let created = Bus {
            id: Uuid::new_v4(),
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
        };

        let mut inner = self.lock();
        if inner
            .buses
            .values()
            .any(|b| b.bus_number == created.bus_number)
        {
            return Err(format!("bus_number '{}' already exists", created.bus_number).into());
        }

        for label in seat_labels(bus.no_of_seats) {
            let seat = Seat {
                id: Uuid::new_v4(),
                bus_id: created.id,
                seat_number: label,
                is_booked: false,
            };
            inner.seats.insert(seat.id, seat);
        }
        inner.buses.insert(created.id, created.clone());

        Ok(created)
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.lock();
        let mut buses: Vec<Bus> = inner.buses.values().cloned().collect();
        buses.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.bus_number.cmp(&b.bus_number))
        });
        Ok(buses)
    }

    async fn get_bus(
        &self,
        id: Uuid,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.lock().buses.get(&id).cloned())
    }

    async fn update_bus(
        &self,
        id: Uuid,
        update: &BusUpdate,
    ) -> Result<Option<Bus>, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.lock();
        let Some(bus) = inner.buses.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(bus, Utc::now());
        Ok(Some(bus.clone()))
    }

    async fn delete_bus(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.lock();
        if inner.buses.remove(&id).is_none() {
            return Ok(false);
        }
        // Cascade: the bus takes its seats and their bookings with it.
        inner.seats.retain(|_, seat| seat.bus_id != id);
        inner.bookings.retain(|booking| booking.bus_id != id);
        Ok(true)
    }

    async fn get_seat(
        &self,
        id: Uuid,
    ) -> Result<Option<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.lock().seats.get(&id).cloned())
    }

    async fn seats_for_bus(
        &self,
        bus_id: Uuid,
    ) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.lock();
        let mut seats: Vec<Seat> = inner
            .seats
            .values()
            .filter(|seat| seat.bus_id == bus_id)
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        Ok(seats)
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn reserve_seat(
        &self,
        caller: &User,
        seat_id: Uuid,
    ) -> Result<BookingDetail, ReserveError> {
        // One lock across check, flip, and insert: the serialization point.
        let mut inner = self.lock();

        let seat = match inner.seats.get(&seat_id) {
            Some(seat) => seat.clone(),
            None => return Err(ReserveError::SeatNotFound(seat_id)),
        };
        if seat.is_booked {
            return Err(ReserveError::SeatAlreadyBooked(seat_id));
        }

        let bus_label = inner
            .buses
            .get(&seat.bus_id)
            .map(Bus::label)
            .ok_or_else(|| ReserveError::Store("seat references a missing bus".into()))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: caller.id,
            bus_id: seat.bus_id,
            seat_id,
            booking_time: Utc::now(),
        };

        if let Some(stored) = inner.seats.get_mut(&seat_id) {
            stored.is_booked = true;
        }
        inner.bookings.push(booking.clone());

        Ok(BookingDetail {
            id: booking.id,
            user: caller.username.clone(),
            bus: bus_label,
            seat: Seat {
                is_booked: true,
                ..seat
            },
            booking_time: booking.booking_time,
        })
    }

    async fn bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.lock();
        let mut details = Vec::new();
        for booking in inner.bookings.iter().filter(|b| b.user_id == user_id) {
            let seat = inner
                .seats
                .get(&booking.seat_id)
                .cloned()
                .ok_or("booking references a missing seat")?;
            let bus_label = inner
                .buses
                .get(&booking.bus_id)
                .map(Bus::label)
                .ok_or("booking references a missing bus")?;
            let user = inner
                .users
                .get(&booking.user_id)
                .map(|u| u.username.clone())
                .ok_or("booking references a missing user")?;

            details.push(BookingDetail {
                id: booking.id,
                user,
                bus: bus_label,
                seat,
                booking_time: booking.booking_time,
            });
        }
        details.sort_by(|a, b| b.booking_time.cmp(&a.booking_time));
        Ok(details)
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, IdentityError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.username == username) {
            return Err(IdentityError::Validation(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let user = record.user();
        inner.users.insert(record.id, record);
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, IdentityError> {
        Ok(self.lock().users.get(&id).map(UserRecord::user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn new_bus(seats: i32) -> NewBus {
        NewBus {
            bus_name: "Express 101".to_string(),
            bus_number: "KA-01-1234".to_string(),
            origin: "Bengaluru".to_string(),
            destination: "Mysuru".to_string(),
            features: "AC, WiFi".to_string(),
            departure_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            no_of_seats: seats,
            price_amount: 45000,
            price_currency: "INR".to_string(),
        }
    }

    async fn seed_user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(name, &format!("{name}@example.com"), "hash")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_bus_generates_unbooked_seats() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(2)).await.unwrap();

        let seats = store.seats_for_bus(bus.id).await.unwrap();
        let labels: Vec<&str> = seats.iter().map(|s| s.seat_number.as_str()).collect();
        assert_eq!(labels, vec!["A1", "A2"]);
        assert!(seats.iter().all(|s| !s.is_booked));
    }

    #[tokio::test]
    async fn reserve_flips_flag_and_records_booking() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(2)).await.unwrap();
        let seats = store.seats_for_bus(bus.id).await.unwrap();
        let alice = seed_user(&store, "alice").await;

        let detail = store.reserve_seat(&alice, seats[0].id).await.unwrap();
        assert_eq!(detail.user, "alice");
        assert_eq!(detail.bus, "Express 101 - KA-01-1234");
        assert_eq!(detail.seat.seat_number, "A1");
        assert!(detail.seat.is_booked);

        let reread = store.get_seat(seats[0].id).await.unwrap().unwrap();
        assert!(reread.is_booked);

        let bookings = store.bookings_for_user(alice.id).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, detail.id);
    }

    #[tokio::test]
    async fn second_reserve_always_conflicts() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(1)).await.unwrap();
        let seat_id = store.seats_for_bus(bus.id).await.unwrap()[0].id;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;

        store.reserve_seat(&alice, seat_id).await.unwrap();
        let err = store.reserve_seat(&bob, seat_id).await.unwrap_err();
        assert!(matches!(err, ReserveError::SeatAlreadyBooked(id) if id == seat_id));

        assert!(store.bookings_for_user(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reserve_missing_seat_mutates_nothing() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(2)).await.unwrap();
        let alice = seed_user(&store, "alice").await;

        let err = store.reserve_seat(&alice, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ReserveError::SeatNotFound(_)));

        let seats = store.seats_for_bus(bus.id).await.unwrap();
        assert!(seats.iter().all(|s| !s.is_booked));
        assert!(store.bookings_for_user(alice.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_have_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let bus = store.create_bus(&new_bus(1)).await.unwrap();
        let seat_id = store.seats_for_bus(bus.id).await.unwrap()[0].id;

        let mut handles = Vec::new();
        for i in 0..16 {
            let user = seed_user(&store, &format!("user{i}")).await;
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.reserve_seat(&user, seat_id).await
            }));
        }

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(ReserveError::SeatAlreadyBooked(_)) => conflicts += 1,
                Err(err) => panic!("unexpected reserve outcome: {err}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.lock().bookings.len(), 1);
    }

    #[tokio::test]
    async fn delete_bus_cascades_to_seats_and_bookings() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(2)).await.unwrap();
        let seat_id = store.seats_for_bus(bus.id).await.unwrap()[0].id;
        let alice = seed_user(&store, "alice").await;
        store.reserve_seat(&alice, seat_id).await.unwrap();

        assert!(store.delete_bus(bus.id).await.unwrap());
        assert!(store.seats_for_bus(bus.id).await.unwrap().is_empty());
        assert!(store.get_seat(seat_id).await.unwrap().is_none());
        assert!(store.bookings_for_user(alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;

        let err = store
            .create_user("alice", "other@example.com", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn update_bus_preserves_seat_map() {
        let store = MemoryStore::new();
        let bus = store.create_bus(&new_bus(3)).await.unwrap();

        let update = BusUpdate {
            destination: Some("Chennai".to_string()),
            ..BusUpdate::default()
        };
        let updated = store.update_bus(bus.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.destination, "Chennai");
        assert_eq!(store.seats_for_bus(bus.id).await.unwrap().len(), 3);
    }
}
