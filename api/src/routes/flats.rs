use actix_web::{HttpResponse, get, put, web};
use payloads::FlatId;
use payloads::requests::UpdateFlat;

use super::APIError;
use crate::store::Store;

#[tracing::instrument(skip(store))]
#[get("/flats")]
pub async fn get_flats(
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    Ok(HttpResponse::Ok().json(store.flats()))
}

#[tracing::instrument(skip(store))]
#[get("/flats/{flat_id}")]
pub async fn get_flat(
    path: web::Path<i64>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let flat = store.get_flat(&FlatId(path.into_inner()))?;
    Ok(HttpResponse::Ok().json(flat))
}

#[tracing::instrument(skip(store))]
#[put("/flats/{flat_id}")]
pub async fn update_flat(
    path: web::Path<i64>,
    details: web::Json<UpdateFlat>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let flat = store.update_flat(&FlatId(path.into_inner()), &details)?;
    Ok(HttpResponse::Ok().json(flat))
}
