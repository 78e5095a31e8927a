//! Demo data for the rental api
//!
//! Used by the dev-server and by integration tests that need a populated
//! catalogue. Written straight into the [`Store`], since the api has no
//! endpoints for creating cars, locations or flats.
//!
//! - Three locations in Warsaw, Krakow and Gdansk
//! - Seven cars spread over them, mostly in Warsaw
//! - Eight flats with ids 1 to 8

use api::Store;
use payloads::{
    Car, CarId, CarModel, Flat, FlatId, LocationData, LocationId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct DevDataset {
    pub warsaw: LocationData,
    pub krakow: LocationData,
    pub gdansk: LocationData,
    pub cars: Vec<Car>,
    pub flats: Vec<Flat>,
}

impl DevDataset {
    /// Insert the dataset into the store and return what was inserted.
    pub fn seed(store: &Store) -> Self {
        let warsaw = location("Marszałkowska 10, 00-590 Warsaw, Poland");
        let krakow = location("Floriańska 3, 31-019 Krakow, Poland");
        let gdansk = location("Długa 45, 80-831 Gdansk, Poland");
        for location in [&warsaw, &krakow, &gdansk] {
            store.insert_location(location.clone());
        }

        let cars = vec![
            car(&warsaw, "Toyota", "Corolla", 2021, 45),
            car(&warsaw, "Skoda", "Octavia", 2019, 40),
            car(&warsaw, "BMW", "X3", 2023, 95),
            car(&warsaw, "Tesla", "Model 3", 2022, 110),
            car(&krakow, "Toyota", "Yaris", 2020, 35),
            car(&krakow, "Volkswagen", "Golf", 2018, 38),
            car(&gdansk, "Ford", "Focus", 2017, 30),
        ];
        for car in &cars {
            store.insert_car(car.clone());
        }

        let flats = vec![
            flat(1, "Sunny studio", "Warsaw", 120, 800, 1),
            flat(2, "Old town loft", "Krakow", 180, 300, 2),
            flat(3, "Seaside apartment", "Gdansk", 210, 150, 3),
            flat(4, "Quiet room", "Warsaw", 70, 2500, 1),
            flat(5, "Family house", "Krakow", 260, 4000, 5),
            flat(6, "River view flat", "Warsaw", 150, 600, 2),
            flat(7, "Garden flat", "Warsaw", 135, 1200, 2),
            flat(8, "Harbour penthouse", "Gdansk", 320, 400, 4),
        ];
        for flat in &flats {
            store.insert_flat(flat.clone());
        }

        tracing::info!(
            cars = cars.len(),
            flats = flats.len(),
            "seeded demo data"
        );
        Self {
            warsaw,
            krakow,
            gdansk,
            cars,
            flats,
        }
    }

    /// Cars parked in the given city, in seeding order.
    pub fn cars_in(&self, city: &str) -> Vec<&Car> {
        self.cars
            .iter()
            .filter(|car| car.location.city().as_deref() == Some(city))
            .collect()
    }

    pub fn flat(&self, id: i64) -> Option<&Flat> {
        self.flats.iter().find(|flat| flat.id == FlatId(id))
    }

    pub fn print_summary(&self) {
        tracing::info!("📊 Demo data:");
        for location in [&self.warsaw, &self.krakow, &self.gdansk] {
            let city = location.city().unwrap_or_default();
            tracing::info!(
                "   {city}: {} cars ({})",
                self.cars_in(&city).len(),
                location.full_address
            );
        }
        tracing::info!(
            "   {} flats, ids {} to {}",
            self.flats.len(),
            self.flats.first().map(|f| f.id.0).unwrap_or_default(),
            self.flats.last().map(|f| f.id.0).unwrap_or_default()
        );
    }
}

fn location(full_address: &str) -> LocationData {
    LocationData {
        id: LocationId(Uuid::new_v4()),
        full_address: full_address.into(),
        latitude: 0.0,
        longitude: 0.0,
    }
}

fn car(
    location: &LocationData,
    brand_name: &str,
    name: &str,
    production_year: i32,
    daily_rate: i64,
) -> Car {
    Car {
        id: CarId(Uuid::new_v4()),
        car_model: CarModel {
            brand_name: brand_name.into(),
            name: name.into(),
            production_year,
            fuel_type: "petrol".into(),
            fuel_capacity: Decimal::from(50),
            seat_count: 5,
            door_count: 5,
            daily_rate: Decimal::from(daily_rate),
        },
        location: location.clone(),
        image_url: None,
    }
}

fn flat(
    id: i64,
    name: &str,
    city: &str,
    price: i64,
    distance: u32,
    room_number: u32,
) -> Flat {
    Flat {
        id: FlatId(id),
        name: name.into(),
        location: city.into(),
        price: Decimal::from(price),
        description: format!("{name} in {city}"),
        distance,
        amenities: vec!["wifi".into(), "kitchen".into()],
        availability: "available".into(),
        images: vec![],
        room_number,
    }
}
