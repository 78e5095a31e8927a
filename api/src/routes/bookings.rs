use actix_web::{HttpResponse, delete, get, post, web};
use payloads::BookingId;
use payloads::requests::CreateBooking;
use serde::Deserialize;

use super::APIError;
use crate::store::Store;
use crate::time::TimeSource;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBookingsQuery {
    user_email: String,
}

/// Bookings that have not ended yet according to the server's clock.
#[tracing::instrument(skip(store, time_source))]
#[get("/bookings/active/flats")]
pub async fn get_active_bookings(
    query: web::Query<ActiveBookingsQuery>,
    store: web::Data<Store>,
    time_source: web::Data<TimeSource>,
) -> Result<HttpResponse, APIError> {
    let bookings =
        store.active_bookings(&query.user_email, time_source.today());
    Ok(HttpResponse::Ok().json(bookings))
}

#[tracing::instrument(skip(store))]
#[post("/bookings")]
pub async fn create_booking(
    details: web::Json<CreateBooking>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let booking = store.create_booking(&details)?;
    Ok(HttpResponse::Created().json(booking))
}

#[tracing::instrument(skip(store))]
#[delete("/bookings/{booking_id}")]
pub async fn delete_booking(
    path: web::Path<i64>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    store.delete_booking(&BookingId(path.into_inner()))?;
    Ok(HttpResponse::NoContent().finish())
}
