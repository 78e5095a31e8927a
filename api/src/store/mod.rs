//! In-memory store for the rental API.
//!
//! All state lives behind one mutex; every operation takes the lock once,
//! so each request sees and leaves a consistent state. Operations that
//! depend on the current time take it as a parameter so that tests can
//! drive them with a mocked [`TimeSource`](crate::time::TimeSource).

mod cars;
mod customers;
mod flats;

use payloads::{
    Booking, BookingId, Car, Customer, Flat, FlatId, LocationData, Rental,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Default)]
pub struct Store {
    data: Arc<Mutex<StoreData>>,
}

#[derive(Default)]
struct StoreData {
    locations: Vec<LocationData>,
    cars: Vec<Car>,
    customers: Vec<Customer>,
    /// Bearer token to customer email
    tokens: HashMap<String, String>,
    rentals: Vec<Rental>,
    flats: Vec<Flat>,
    bookings: Vec<Booking>,
    next_booking_id: i64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a location and the cars parked there.
    pub fn insert_location(&self, location: LocationData) {
        self.lock().locations.push(location);
    }

    pub fn insert_car(&self, car: Car) {
        let mut data = self.lock();
        if !data.locations.iter().any(|l| l.id == car.location.id) {
            data.locations.push(car.location.clone());
        }
        data.cars.push(car);
    }

    pub fn insert_flat(&self, flat: Flat) {
        self.lock().flats.push(flat);
    }

    /// Next unused flat id, for seeding.
    pub fn next_flat_id(&self) -> FlatId {
        let data = self.lock();
        FlatId(data.flats.iter().map(|f| f.id.0).max().unwrap_or(0) + 1)
    }

    fn allocate_booking_id(data: &mut StoreData) -> BookingId {
        data.next_booking_id += 1;
        BookingId(data.next_booking_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Car not found")]
    CarNotFound,
    #[error("Rental not found")]
    RentalNotFound,
    #[error("Flat not found")]
    FlatNotFound,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Customer not found")]
    CustomerNotFound,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Invalid email: {0}")]
    InvalidEmail(&'static str),
    #[error("The car is already rented in this period")]
    CarUnavailable,
    #[error("The flat is already booked in this period")]
    FlatUnavailable,
    #[error("The end must be after the start")]
    InvalidPeriod,
}
