use actix_web::{HttpResponse, get, web};
use jiff::Timestamp;
use payloads::{CarFilter, CarId, SortOrder};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{APIError, PageQuery};
use crate::store::Store;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarsQuery {
    page: Option<u32>,
    size: Option<u32>,
    city: Option<String>,
    /// Comma separated brand names
    brand: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    available_from: Option<Timestamp>,
    available_to: Option<Timestamp>,
    sort: Option<String>,
}

impl CarsQuery {
    fn filter(&self) -> Result<CarFilter, APIError> {
        let sort = match self.sort.as_deref() {
            None => SortOrder::default(),
            Some(sort) => SortOrder::parse(sort).ok_or_else(|| {
                APIError::BadRequest(anyhow::anyhow!("Unknown sort {sort:?}"))
            })?,
        };
        Ok(CarFilter {
            city: self.city.clone(),
            brands: self
                .brand
                .as_deref()
                .map(|brands| brands.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            min_price: self.min_price,
            max_price: self.max_price,
            available_from: self.available_from,
            available_to: self.available_to,
            sort,
        })
    }
}

#[tracing::instrument(skip(store))]
#[get("/cars/")]
pub async fn get_cars(
    query: web::Query<CarsQuery>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let request = PageQuery {
        page: query.page,
        size: query.size,
    }
    .page_request(DEFAULT_PAGE_SIZE)?;
    let filter = query.filter()?;
    Ok(HttpResponse::Ok().json(store.list_cars(request, &filter)))
}

#[tracing::instrument(skip(store))]
#[get("/cars/{car_id}")]
pub async fn get_car(
    path: web::Path<Uuid>,
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    let car = store.get_car(&CarId(path.into_inner()))?;
    Ok(HttpResponse::Ok().json(car))
}

#[tracing::instrument(skip(store))]
#[get("/locations/")]
pub async fn get_locations(
    store: web::Data<Store>,
) -> Result<HttpResponse, APIError> {
    Ok(HttpResponse::Ok().json(store.locations()))
}
