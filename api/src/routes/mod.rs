pub mod bookings;
pub mod cars;
pub mod customers;
pub mod flats;
pub mod rentals;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{
    HttpRequest, HttpResponse, Responder, ResponseError, body::BoxBody,
    dev::HttpServiceFactory, get, web,
};
use payloads::{Customer, PageRequest};
use serde::Deserialize;

use crate::store::{Store, StoreError};

pub fn api_services() -> impl HttpServiceFactory {
    (
        health_check,
        cars::get_cars,
        cars::get_car,
        cars::get_locations,
        rentals::get_rentals,
        rentals::get_rental,
        rentals::create_rental,
        rentals::cancel_rental,
        customers::register,
        customers::login,
        web::scope("/flatly/api")
            .service(flats::get_flats)
            .service(flats::get_flat)
            .service(flats::update_flat)
            .service(bookings::get_active_bookings)
            .service(bookings::create_booking)
            .service(bookings::delete_booking),
    )
}

#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("healthy")
}

#[derive(Debug, thiserror::Error)]
pub enum APIError {
    #[error("Authentication failed")]
    AuthError(#[source] anyhow::Error),
    #[error("Bad request")]
    BadRequest(#[source] anyhow::Error),
    #[error("Not found")]
    NotFound(#[source] anyhow::Error),
    #[error("Conflict")]
    Conflict(#[source] anyhow::Error),
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            Self::AuthError(e) => {
                HttpResponse::Unauthorized().body(format!("{self}: {e}"))
            }
            Self::BadRequest(e) => {
                HttpResponse::BadRequest().body(format!("{self}: {e}"))
            }
            Self::NotFound(e) => {
                HttpResponse::NotFound().body(format!("{self}: {e}"))
            }
            Self::Conflict(e) => {
                HttpResponse::Conflict().body(format!("{self}: {e}"))
            }
            Self::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::CarNotFound
            | StoreError::RentalNotFound
            | StoreError::FlatNotFound
            | StoreError::BookingNotFound
            | StoreError::CustomerNotFound => APIError::NotFound(e.into()),
            StoreError::InvalidToken => APIError::AuthError(e.into()),
            StoreError::EmailTaken
            | StoreError::CarUnavailable
            | StoreError::FlatUnavailable => APIError::Conflict(e.into()),
            StoreError::InvalidEmail(_) | StoreError::InvalidPeriod => {
                APIError::BadRequest(e.into())
            }
        }
    }
}

/// Page parameters shared by the paged list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    fn page_request(&self, default_size: u32) -> Result<PageRequest, APIError> {
        let size = self.size.unwrap_or(default_size);
        if size == 0 {
            return Err(APIError::BadRequest(anyhow::anyhow!(
                "Page size must be positive"
            )));
        }
        Ok(PageRequest {
            page: self.page.unwrap_or(0),
            size,
        })
    }
}

/// Resolve the customer from the request's bearer token.
fn get_customer(
    request: &HttpRequest,
    store: &Store,
) -> Result<Customer, APIError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            APIError::AuthError(anyhow::anyhow!("Missing bearer token"))
        })?;
    let customer = store.customer_for_token(token)?;
    // recorded here, but attaches to the span for the api route itself
    tracing::Span::current()
        .record("customer_id", tracing::field::display(&customer.id));
    Ok(customer)
}
