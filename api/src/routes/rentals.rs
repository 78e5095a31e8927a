use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use payloads::RentalId;
use payloads::requests::CreateRental;
use uuid::Uuid;

use super::{APIError, PageQuery, get_customer};
use crate::store::Store;

const DEFAULT_PAGE_SIZE: u32 = 5;

#[tracing::instrument(
    skip(request, store),
    fields(customer_id = tracing::field::Empty)
)]
#[get("/rentals/")]
pub async fn get_rentals(
    request: HttpRequest,
    query: web::Query<PageQuery>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let customer = get_customer(&request, &store)?;
    let page = query.page_request(DEFAULT_PAGE_SIZE)?;
    Ok(HttpResponse::Ok().json(store.list_rentals(&customer.id, page)))
}

#[tracing::instrument(
    skip(request, store),
    fields(customer_id = tracing::field::Empty)
)]
#[get("/rentals/{rental_id}")]
pub async fn get_rental(
    request: HttpRequest,
    path: web::Path<Uuid>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let customer = get_customer(&request, &store)?;
    let rental =
        store.get_rental(&customer.id, &RentalId(path.into_inner()))?;
    Ok(HttpResponse::Ok().json(rental))
}

#[tracing::instrument(
    skip(request, store),
    fields(customer_id = tracing::field::Empty)
)]
#[post("/rentals/")]
pub async fn create_rental(
    request: HttpRequest,
    details: web::Json<CreateRental>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let customer = get_customer(&request, &store)?;
    let rental = store.create_rental(&customer, &details)?;
    Ok(HttpResponse::Created().json(rental))
}

#[tracing::instrument(
    skip(request, store),
    fields(customer_id = tracing::field::Empty)
)]
#[delete("/rentals/{rental_id}")]
pub async fn cancel_rental(
    request: HttpRequest,
    path: web::Path<Uuid>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let customer = get_customer(&request, &store)?;
    store.cancel_rental(&customer.id, &RentalId(path.into_inner()))?;
    Ok(HttpResponse::NoContent().finish())
}
