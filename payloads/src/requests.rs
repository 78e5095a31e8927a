use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BookingStatus, CarId, FlatId};

pub const EMAIL_MAX_LEN: usize = 255;

/// Tag attached to bookings created from this client.
pub const BOOKING_SYSTEM: &str = "MOBILE";

/// Validation result for email addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidation {
    Valid,
    Empty,
    TooLong,
    MissingAt,
    InvalidDomain,
}

impl EmailValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Empty => Some("Email is required"),
            Self::TooLong => Some("Email must be at most 255 characters"),
            Self::MissingAt => Some("Email must contain an @"),
            Self::InvalidDomain => Some("Email domain is not valid"),
        }
    }
}

/// Validate an email address.
///
/// This is only a plausibility check; the backend owns the real rules.
pub fn validate_email(email: &str) -> EmailValidation {
    let email = email.trim();
    if email.is_empty() {
        return EmailValidation::Empty;
    }
    if email.len() > EMAIL_MAX_LEN {
        return EmailValidation::TooLong;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return EmailValidation::MissingAt;
    };
    if local.is_empty()
        || domain.starts_with('.')
        || domain.ends_with('.')
        || !domain.contains('.')
        || domain.contains('@')
    {
        return EmailValidation::InvalidDomain;
    }
    EmailValidation::Valid
}

/// Body of both the register and the login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEmail {
    pub email: String,
}

impl CustomerEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRental {
    pub car_id: CarId,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
}

impl CreateRental {
    pub fn is_valid(&self) -> bool {
        self.start_at < self.end_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub flat_id: FlatId,
    pub user_email: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatus,
    pub system: String,
}

impl CreateBooking {
    /// A new pending booking made through this client.
    pub fn new(
        flat_id: FlatId,
        user_email: impl Into<String>,
        start_date: Date,
        end_date: Date,
    ) -> Self {
        Self {
            flat_id,
            user_email: user_email.into(),
            start_date,
            end_date,
            status: BookingStatus::Pending,
            system: BOOKING_SYSTEM.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start_date <= self.end_date
    }
}

/// Partial update of a flat; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<u32>,
}

impl UpdateFlat {
    /// Apply the set fields onto an existing flat.
    pub fn apply_to(&self, flat: &mut crate::Flat) {
        if let Some(name) = &self.name {
            flat.name = name.clone();
        }
        if let Some(location) = &self.location {
            flat.location = location.clone();
        }
        if let Some(price) = self.price {
            flat.price = price;
        }
        if let Some(description) = &self.description {
            flat.description = description.clone();
        }
        if let Some(distance) = self.distance {
            flat.distance = distance;
        }
        if let Some(amenities) = &self.amenities {
            flat.amenities = amenities.clone();
        }
        if let Some(availability) = &self.availability {
            flat.availability = availability.clone();
        }
        if let Some(images) = &self.images {
            flat.images = images.clone();
        }
        if let Some(room_number) = self.room_number {
            flat.room_number = room_number;
        }
    }
}
