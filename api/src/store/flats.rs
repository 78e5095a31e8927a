use jiff::civil::Date;
use payloads::requests::{CreateBooking, UpdateFlat, validate_email};
use payloads::{Booking, BookingId, BookingStatus, Flat, FlatBooking, FlatId};

use super::{Store, StoreError};

impl Store {
    /// Every flat, in insertion order.
    pub fn flats(&self) -> Vec<Flat> {
        self.lock().flats.clone()
    }

    pub fn get_flat(&self, flat_id: &FlatId) -> Result<Flat, StoreError> {
        self.lock()
            .flats
            .iter()
            .find(|flat| flat.id == *flat_id)
            .cloned()
            .ok_or(StoreError::FlatNotFound)
    }

    pub fn update_flat(
        &self,
        flat_id: &FlatId,
        details: &UpdateFlat,
    ) -> Result<Flat, StoreError> {
        let mut data = self.lock();
        let flat = data
            .flats
            .iter_mut()
            .find(|flat| flat.id == *flat_id)
            .ok_or(StoreError::FlatNotFound)?;
        details.apply_to(flat);
        Ok(flat.clone())
    }

    /// The user's bookings that end today or later, with their flats.
    pub fn active_bookings(
        &self,
        user_email: &str,
        today: Date,
    ) -> Vec<FlatBooking> {
        let data = self.lock();
        data.bookings
            .iter()
            .filter(|b| b.user_email.eq_ignore_ascii_case(user_email.trim()))
            .filter(|b| b.status != BookingStatus::Cancelled)
            .filter(|b| b.end_date >= today)
            .filter_map(|booking| {
                let flat = data.flats.iter().find(|f| f.id == booking.flat_id)?;
                Some(FlatBooking {
                    id: booking.id,
                    flat: flat.clone(),
                })
            })
            .collect()
    }

    pub fn create_booking(
        &self,
        details: &CreateBooking,
    ) -> Result<Booking, StoreError> {
        let email = validate_email(&details.user_email);
        if let Some(message) = email.error_message() {
            return Err(StoreError::InvalidEmail(message));
        }
        if !details.is_valid() {
            return Err(StoreError::InvalidPeriod);
        }
        let mut data = self.lock();
        if !data.flats.iter().any(|flat| flat.id == details.flat_id) {
            return Err(StoreError::FlatNotFound);
        }
        // both ends of a booking are inclusive
        let taken = data.bookings.iter().any(|b| {
            b.flat_id == details.flat_id
                && b.status != BookingStatus::Cancelled
                && b.start_date <= details.end_date
                && details.start_date <= b.end_date
        });
        if taken {
            return Err(StoreError::FlatUnavailable);
        }
        let booking = Booking {
            id: Store::allocate_booking_id(&mut data),
            flat_id: details.flat_id,
            user_email: details.user_email.trim().to_string(),
            start_date: details.start_date,
            end_date: details.end_date,
            status: details.status,
            system: details.system.clone(),
        };
        data.bookings.push(booking.clone());
        Ok(booking)
    }

    pub fn delete_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<(), StoreError> {
        let mut data = self.lock();
        let index = data
            .bookings
            .iter()
            .position(|b| b.id == *booking_id)
            .ok_or(StoreError::BookingNotFound)?;
        data.bookings.remove(index);
        Ok(())
    }
}
