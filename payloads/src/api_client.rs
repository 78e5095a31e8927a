use crate::{
    BookingId, Car, CarFilter, CarId, Flat, FlatBooking, FlatId, LocationData,
    Page, PageRequest, QueryParams, Rental, RentalId, Session, requests,
    responses::AuthData,
};
use reqwest::{Method, RequestBuilder, StatusCode, header::AUTHORIZATION};
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

const FLATLY_PREFIX: &str = "/flatly/api";

/// An API client for the rental backend.
///
/// Every request carries `Authorization: Bearer <token>` while the session
/// holds a token. Registering or logging in stores the returned token in
/// the session.
#[derive(Clone, Debug)]
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
    pub session: Session,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>, session: Session) -> Self {
        Self {
            address: address.into(),
            inner_client: reqwest::Client::new(),
            session,
        }
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}{path}", self.address.trim_end_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.format_url(path);
        tracing::debug!(%method, %url, "api request");
        let request = self.inner_client.request(method, url);
        match self.session.authorization() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    async fn get(
        &self,
        path: &str,
        params: &impl QueryParams,
    ) -> ReqwestResult {
        self.request(Method::GET, path)
            .query(&params.query_pairs())
            .send()
            .await
    }

    async fn empty_get(&self, path: &str) -> ReqwestResult {
        self.request(Method::GET, path).send().await
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.request(Method::POST, path).json(body).send().await
    }

    async fn put(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.request(Method::PUT, path).json(body).send().await
    }

    async fn delete(&self, path: &str) -> ReqwestResult {
        self.request(Method::DELETE, path).send().await
    }
}

/// Methods on the backend API
impl APIClient {
    pub async fn health_check(&self) -> Result<(), ClientError> {
        let response = self.empty_get("/health_check").await?;
        ok_empty(response).await
    }

    /// Fetch a page of cars matching the filter.
    pub async fn get_cars(
        &self,
        page: PageRequest,
        filter: &CarFilter,
    ) -> Result<Page<Car>, ClientError> {
        let response = self.get("/cars/", &(page, filter.clone())).await?;
        ok_body(response).await
    }

    pub async fn get_car(&self, car_id: &CarId) -> Result<Car, ClientError> {
        let response = self.empty_get(&format!("/cars/{car_id}")).await?;
        ok_body(response).await
    }

    /// Fetch a page of the current customer's rentals.
    pub async fn get_rentals(
        &self,
        page: PageRequest,
    ) -> Result<Page<Rental>, ClientError> {
        let response = self.get("/rentals/", &page).await?;
        ok_body(response).await
    }

    pub async fn get_rental(
        &self,
        rental_id: &RentalId,
    ) -> Result<Rental, ClientError> {
        let response =
            self.empty_get(&format!("/rentals/{rental_id}")).await?;
        ok_body(response).await
    }

    /// Rent a car for the given period.
    pub async fn create_rental(
        &self,
        details: &requests::CreateRental,
    ) -> Result<Rental, ClientError> {
        let response = self.post("/rentals/", details).await?;
        ok_body(response).await
    }

    pub async fn cancel_rental(
        &self,
        rental_id: &RentalId,
    ) -> Result<(), ClientError> {
        let response = self.delete(&format!("/rentals/{rental_id}")).await?;
        ok_empty(response).await
    }

    /// All known car pickup locations.
    pub async fn get_locations(
        &self,
    ) -> Result<Vec<LocationData>, ClientError> {
        let response = self.empty_get("/locations/").await?;
        ok_body(response).await
    }

    /// All flats. The flats service does not page or filter server side.
    pub async fn get_flats(&self) -> Result<Vec<Flat>, ClientError> {
        let response =
            self.empty_get(&format!("{FLATLY_PREFIX}/flats")).await?;
        ok_body(response).await
    }

    pub async fn get_flat(
        &self,
        flat_id: &FlatId,
    ) -> Result<Flat, ClientError> {
        let response = self
            .empty_get(&format!("{FLATLY_PREFIX}/flats/{flat_id}"))
            .await?;
        ok_body(response).await
    }

    pub async fn update_flat(
        &self,
        flat_id: &FlatId,
        details: &requests::UpdateFlat,
    ) -> Result<Flat, ClientError> {
        let response = self
            .put(&format!("{FLATLY_PREFIX}/flats/{flat_id}"), details)
            .await?;
        ok_body(response).await
    }

    /// Bookings for the user that have not ended yet, with their flats.
    pub async fn get_active_bookings(
        &self,
        user_email: &str,
    ) -> Result<Vec<FlatBooking>, ClientError> {
        let response = self
            .get(
                &format!("{FLATLY_PREFIX}/bookings/active/flats"),
                &UserEmail(user_email),
            )
            .await?;
        ok_body(response).await
    }

    pub async fn create_booking(
        &self,
        details: &requests::CreateBooking,
    ) -> Result<crate::Booking, ClientError> {
        let response = self
            .post(&format!("{FLATLY_PREFIX}/bookings"), details)
            .await?;
        ok_body(response).await
    }

    pub async fn delete_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<(), ClientError> {
        let response = self
            .delete(&format!("{FLATLY_PREFIX}/bookings/{booking_id}"))
            .await?;
        ok_empty(response).await
    }

    /// Register a new customer and store the returned token in the session.
    pub async fn register(
        &self,
        details: &requests::CustomerEmail,
    ) -> Result<AuthData, ClientError> {
        let response = self.post("/customers", details).await?;
        self.authenticate(response, &details.email).await
    }

    /// Log in an existing customer and store the returned token in the
    /// session.
    pub async fn login(
        &self,
        details: &requests::CustomerEmail,
    ) -> Result<AuthData, ClientError> {
        let response = self.put("/customers/login", details).await?;
        self.authenticate(response, &details.email).await
    }

    /// Forget the session token. The backend keeps no session state.
    pub fn logout(&self) {
        self.session.clear();
    }

    async fn authenticate(
        &self,
        response: reqwest::Response,
        email: &str,
    ) -> Result<AuthData, ClientError> {
        let response = ok_response(response).await?;
        let token = bearer_token(&response)?;
        self.session.set_token(token.clone());
        Ok(AuthData {
            email: email.to_string(),
            token,
        })
    }
}

struct UserEmail<'a>(&'a str);

impl QueryParams for UserEmail<'_> {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("userEmail", self.0.to_string())]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    #[error("No Authorization header found")]
    AuthHeaderMissing,
    #[error("Malformed Authorization header")]
    MalformedAuthHeader,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::APIError(status, _) => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` response
/// header.
pub fn bearer_token(
    response: &reqwest::Response,
) -> Result<String, ClientError> {
    let header = response
        .headers()
        .get(AUTHORIZATION)
        .ok_or(ClientError::AuthHeaderMissing)?;
    let value = header
        .to_str()
        .map_err(|_| ClientError::MalformedAuthHeader)?;
    parse_bearer(value).ok_or(ClientError::MalformedAuthHeader)
}

fn parse_bearer(value: &str) -> Option<String> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty())
        .then(|| token.to_string())
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = ok_response(response).await?;
    Ok(response.json::<T>().await?)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    ok_response(response).await?;
    Ok(())
}

async fn ok_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(response)
}
