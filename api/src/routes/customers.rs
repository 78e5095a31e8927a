use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpResponse, HttpResponseBuilder, post, put, web};
use payloads::Customer;
use payloads::requests::CustomerEmail;

use super::APIError;
use crate::Config;
use crate::store::Store;

#[tracing::instrument(skip(store, config), fields(email = %details.email))]
#[post("/customers")]
pub async fn register(
    details: web::Json<CustomerEmail>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, APIError> {
    let (customer, token) = store.register(&details.email)?;
    tracing::info!(customer_id = %customer.id, "registered");
    Ok(authenticated(HttpResponse::Created(), &config, &customer, &token))
}

#[tracing::instrument(skip(store, config), fields(email = %details.email))]
#[put("/customers/login")]
pub async fn login(
    details: web::Json<CustomerEmail>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, APIError> {
    let (customer, token) = store.login(&details.email)?;
    Ok(authenticated(HttpResponse::Ok(), &config, &customer, &token))
}

fn authenticated(
    mut response: HttpResponseBuilder,
    config: &Config,
    customer: &Customer,
    token: &str,
) -> HttpResponse {
    if config.issue_auth_header {
        response.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    response.json(customer)
}
