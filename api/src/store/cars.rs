use jiff::Timestamp;
use payloads::requests::CreateRental;
use payloads::{
    Car, CarFilter, CarId, Customer, CustomerId, LocationData, Page,
    PageRequest, Rental, RentalId, SortOrder,
};
use std::cmp::Reverse;
use uuid::Uuid;

use super::{Store, StoreData, StoreError};

impl Store {
    /// A page of the cars matching the filter.
    ///
    /// When an availability period is given, cars with a rental overlapping
    /// it are left out. Open ends of the period are unbounded.
    pub fn list_cars(
        &self,
        request: PageRequest,
        filter: &CarFilter,
    ) -> Page<Car> {
        let data = self.lock();
        let brands: Vec<String> = filter
            .canonical_brands()
            .iter()
            .map(|brand| brand.to_lowercase())
            .collect();
        let city = filter
            .city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty());

        let mut cars: Vec<Car> = data
            .cars
            .iter()
            .filter(|car| {
                city.is_none_or(|city| {
                    car.location
                        .city()
                        .is_some_and(|c| c.eq_ignore_ascii_case(city))
                })
            })
            .filter(|car| {
                let brand = car.car_model.brand_name.to_lowercase();
                brands.is_empty() || brands.contains(&brand)
            })
            .filter(|car| {
                let rate = car.car_model.daily_rate;
                filter.min_price.is_none_or(|min| rate >= min)
                    && filter.max_price.is_none_or(|max| rate <= max)
            })
            .filter(|car| {
                if filter.available_from.is_none()
                    && filter.available_to.is_none()
                {
                    return true;
                }
                let from = filter.available_from.unwrap_or(Timestamp::MIN);
                let to = filter.available_to.unwrap_or(Timestamp::MAX);
                !is_rented(&data, &car.id, from, to)
            })
            .cloned()
            .collect();

        match filter.sort {
            SortOrder::Newest => {
                cars.sort_by_key(|car| Reverse(car.car_model.production_year))
            }
            SortOrder::Popularity => cars.sort_by_key(|car| {
                Reverse(
                    data.rentals.iter().filter(|r| r.car.id == car.id).count(),
                )
            }),
            SortOrder::PriceAscending => {
                cars.sort_by_key(|car| car.car_model.daily_rate)
            }
            SortOrder::PriceDescending => {
                cars.sort_by_key(|car| Reverse(car.car_model.daily_rate))
            }
        }
        Page::from_items(&cars, request)
    }

    pub fn get_car(&self, car_id: &CarId) -> Result<Car, StoreError> {
        self.lock()
            .cars
            .iter()
            .find(|car| car.id == *car_id)
            .cloned()
            .ok_or(StoreError::CarNotFound)
    }

    pub fn locations(&self) -> Vec<LocationData> {
        self.lock().locations.clone()
    }

    /// The customer's rentals, latest start first.
    pub fn list_rentals(
        &self,
        customer_id: &CustomerId,
        request: PageRequest,
    ) -> Page<Rental> {
        let data = self.lock();
        let mut rentals: Vec<Rental> = data
            .rentals
            .iter()
            .filter(|rental| rental.customer.id == *customer_id)
            .cloned()
            .collect();
        rentals.sort_by_key(|rental| Reverse(rental.start_at));
        Page::from_items(&rentals, request)
    }

    /// Only the customer who made a rental can see it.
    pub fn get_rental(
        &self,
        customer_id: &CustomerId,
        rental_id: &RentalId,
    ) -> Result<Rental, StoreError> {
        self.lock()
            .rentals
            .iter()
            .find(|r| r.id == *rental_id && r.customer.id == *customer_id)
            .cloned()
            .ok_or(StoreError::RentalNotFound)
    }

    pub fn create_rental(
        &self,
        customer: &Customer,
        details: &CreateRental,
    ) -> Result<Rental, StoreError> {
        if !details.is_valid() {
            return Err(StoreError::InvalidPeriod);
        }
        let mut data = self.lock();
        let car = data
            .cars
            .iter()
            .find(|car| car.id == details.car_id)
            .cloned()
            .ok_or(StoreError::CarNotFound)?;
        if is_rented(&data, &car.id, details.start_at, details.end_at) {
            return Err(StoreError::CarUnavailable);
        }
        let rental = Rental {
            id: RentalId(Uuid::new_v4()),
            car,
            customer: customer.clone(),
            start_at: details.start_at,
            end_at: details.end_at,
            is_cancelled: false,
        };
        data.rentals.push(rental.clone());
        Ok(rental)
    }

    /// Cancelling twice is not an error.
    pub fn cancel_rental(
        &self,
        customer_id: &CustomerId,
        rental_id: &RentalId,
    ) -> Result<(), StoreError> {
        let mut data = self.lock();
        let rental = data
            .rentals
            .iter_mut()
            .find(|r| r.id == *rental_id && r.customer.id == *customer_id)
            .ok_or(StoreError::RentalNotFound)?;
        rental.is_cancelled = true;
        Ok(())
    }
}

fn is_rented(
    data: &StoreData,
    car_id: &CarId,
    from: Timestamp,
    to: Timestamp,
) -> bool {
    data.rentals.iter().any(|rental| {
        rental.car.id == *car_id
            && !rental.is_cancelled
            && rental.start_at < to
            && from < rental.end_at
    })
}
