pub mod request_log;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod time;

use actix_cors::Cors;
use actix_web::dev::{Server, Service};
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::net::TcpListener;

pub use request_log::{RecordedRequest, RequestLog};
pub use store::{Store, StoreError};

use crate::time::TimeSource;

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub fn build(
    config: &mut Config,
    store: Store,
    time_source: TimeSource,
    request_log: RequestLog,
) -> std::io::Result<Server> {
    let store = web::Data::new(store);
    let time_source = web::Data::new(time_source);

    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();
    let app_config = web::Data::new(config.clone());
    let allowed_origins = config.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let cors = if allowed_origins.iter().any(|origin| origin == "*") {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .expose_any_header()
        } else {
            let mut cors = Cors::default()
                .allow_any_method()
                .allow_any_header()
                .expose_any_header();
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            cors
        };

        let request_log = request_log.clone();
        App::new()
            .wrap_fn(move |request, service| {
                request_log.record(
                    request.method().as_str(),
                    request.path(),
                    request.query_string(),
                );
                service.call(request)
            })
            .wrap(cors)
            .service(routes::api_services())
            .app_data(store.clone())
            .app_data(time_source.clone())
            .app_data(app_config.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}

#[derive(Debug, Clone)]
pub struct Config {
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
    /// List of allowed CORS origins. Use "*" to allow any origin
    pub allowed_origins: Vec<String>,
    /// Send the bearer token in the `Authorization` header of register and
    /// login responses. Turned off to test clients against a misbehaving
    /// server.
    pub issue_auth_header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".into(),
            port: 8000,
            allowed_origins: vec!["*".into()],
            issue_auth_header: true,
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to the
    /// defaults for unset variables.
    ///
    /// - IP_ADDRESS
    /// - PORT
    /// - ALLOWED_ORIGINS: comma separated, "*" for any
    /// - ISSUE_AUTH_HEADER: "true" or "false"
    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        let defaults = Self::default();
        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Ok(origins) => origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.allowed_origins,
        };
        let port = match var("PORT") {
            Ok(port) => port.parse().context("PORT must be a port number")?,
            Err(_) => defaults.port,
        };
        let issue_auth_header = match var("ISSUE_AUTH_HEADER") {
            Ok(value) => value
                .parse()
                .context("ISSUE_AUTH_HEADER must be true or false")?,
            Err(_) => defaults.issue_auth_header,
        };

        Ok(Config {
            ip: var("IP_ADDRESS").unwrap_or(defaults.ip),
            port,
            allowed_origins,
            issue_auth_header,
        })
    }
}
