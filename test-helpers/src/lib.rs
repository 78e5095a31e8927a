use api::time::TimeSource;

pub mod mock;
use api::{Config, RequestLog, Store, telemetry};
use payloads::{APIClient, Session, requests, responses::AuthData};
use query::QueryClient;
use reqwest::StatusCode;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

use crate::mock::DevDataset;

/// Mocked "now" that every test starts from.
pub const TEST_START: &str = "2025-01-01T00:00:00Z";

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    /// Base URL of the running server
    pub address: String,
    pub client: APIClient,
    /// Query client sharing the session of `client`
    pub query: QueryClient,
    pub store: Store,
    pub request_log: RequestLog,
    pub time_source: TimeSource,
}

impl TestApp {
    /// An api client with its own empty session, for acting as a second
    /// user.
    pub fn new_client(&self) -> APIClient {
        APIClient::new(&self.address, Session::new())
    }

    /// Populate the store with the demo cars, locations and flats.
    pub fn seed(&self) -> DevDataset {
        DevDataset::seed(&self.store)
    }

    /// Register a customer through the api, leaving `client` (and `query`,
    /// which shares its session) logged in as them.
    pub async fn register_customer(
        &self,
        email: &str,
    ) -> anyhow::Result<AuthData> {
        let auth = self
            .client
            .register(&requests::CustomerEmail::new(email))
            .await?;
        Ok(auth)
    }

    pub async fn register_alice(&self) -> anyhow::Result<AuthData> {
        self.register_customer("alice@example.com").await
    }

    /// Number of requests the server received for exactly this path and
    /// query string, e.g. `/cars/?page=0&size=10&city=Warsaw`.
    pub fn requests_for(&self, method: &str, path_and_query: &str) -> usize {
        self.request_log
            .requests()
            .iter()
            .filter(|r| {
                r.method == method && r.path_and_query() == path_and_query
            })
            .count()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config {
        port: 0,
        ..Config::default()
    })
    .await
}

/// Start the api with a custom configuration. The port is always
/// OS-assigned.
pub async fn spawn_app_with(mut config: Config) -> TestApp {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    #[cfg(feature = "mock-time")]
    let time_source = TimeSource::new(TEST_START.parse().unwrap());

    #[cfg(not(feature = "mock-time"))]
    let time_source = TimeSource::new();

    config.ip = "127.0.0.1".into();
    config.port = 0;

    let store = Store::new();
    let request_log = RequestLog::new();
    let server = api::build(
        &mut config,
        store.clone(),
        time_source.clone(),
        request_log.clone(),
    )
    .unwrap();
    tokio::spawn(server);

    let address = format!("http://127.0.0.1:{}", config.port);
    let client = APIClient::new(&address, Session::new());

    TestApp {
        port: config.port,
        address,
        query: QueryClient::new(client.clone()),
        client,
        store,
        request_log,
        time_source,
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(payloads::ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}

/// Like [`assert_status_code`], for results coming through the query layer.
pub fn assert_query_status_code<T>(
    result: Result<T, query::QueryError>,
    expected: StatusCode,
) {
    match result {
        Err(e) => {
            let status = e.client_error().and_then(|e| e.status());
            assert_eq!(status, Some(expected))
        }
        Ok(_) => panic!("Expected APIError"),
    };
}
