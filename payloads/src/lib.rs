pub mod api_client;
pub mod filters;
pub mod requests;
pub mod responses;
pub mod session;

pub use api_client::{APIClient, ClientError};
pub use filters::{CarFilter, FlatFilter, QueryParams, SortOrder};
pub use responses::{Page, PageMeta, PageRequest};
pub use session::Session;

use derive_more::Display;
use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id type wrappers help ensure we don't mix up ids for different resources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CarId(pub Uuid);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RentalId(pub Uuid);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocationId(pub Uuid);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct FlatId(pub i64);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct BookingId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarModel {
    pub brand_name: String,
    pub name: String,
    pub production_year: i32,
    pub fuel_type: String,
    /// Litres
    pub fuel_capacity: Decimal,
    pub seat_count: u32,
    pub door_count: u32,
    pub daily_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub id: LocationId,
    pub full_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationData {
    /// Extract the city from the full address.
    ///
    /// Addresses are comma separated and end with the country, e.g.
    /// "Marszałkowska 10, 00-590 Warsaw, Poland". The city is the segment
    /// before the country with any postal code removed. Addresses with a
    /// single segment are treated as the city itself.
    pub fn city(&self) -> Option<String> {
        let segments: Vec<&str> = self
            .full_address
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let segment = match segments.len() {
            0 => return None,
            1 => segments[0],
            n => segments[n - 2],
        };
        let city = segment
            .split_whitespace()
            .filter(|word| !word.chars().any(|c| c.is_ascii_digit()))
            .collect::<Vec<_>>()
            .join(" ");
        (!city.is_empty()).then_some(city)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,
    pub car_model: CarModel,
    pub location: LocationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: RentalId,
    pub car: Car,
    pub customer: Customer,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub is_cancelled: bool,
}

impl Rental {
    /// A rental is active until it is cancelled or its end has passed.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_cancelled && self.end_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flat {
    pub id: FlatId,
    pub name: String,
    pub location: String,
    pub price: Decimal,
    pub description: String,
    /// Metres from the searching user's reference point
    pub distance: u32,
    pub amenities: Vec<String>,
    pub availability: String,
    pub images: Vec<String>,
    pub room_number: u32,
}

impl Flat {
    /// Whether the listing is open for new bookings.
    pub fn is_available(&self) -> bool {
        self.availability.trim().eq_ignore_ascii_case("available")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub flat_id: FlatId,
    pub user_email: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatus,
    /// Tag of the system the booking was made through.
    pub system: String,
}

/// A booking together with the flat it reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBooking {
    pub id: BookingId,
    pub flat: Flat,
}

/// The result of looking up something that may legitimately be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Self::Found(value) => Lookup::Found(value),
            Self::NotFound => Lookup::NotFound,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}
