use api::{
    Config, RequestLog, Store, build,
    telemetry::{get_subscriber, init_subscriber},
    time::TimeSource,
};

/// In-memory rental API server. Starts empty; use the dev-server crate for
/// a server with demo data.
///
/// Environment variables can be set directly or loaded from a .env file in
/// the project root. All are optional:
/// - IP_ADDRESS: bind address (default 127.0.0.1, 0.0.0.0 for public)
/// - PORT: server port (default 8000)
/// - ALLOWED_ORIGINS: CORS origins, "*" for any (default)
/// - ISSUE_AUTH_HEADER: send the bearer token on register/login (default
///   true)
///
/// Example development command:
/// IP_ADDRESS=127.0.0.1 PORT=8000 cargo run --bin api
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // This will silently ignore if the file doesn't exist
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("info".into());
    init_subscriber(subscriber)?;

    let mut config = Config::from_env()?;

    #[cfg(not(feature = "mock-time"))]
    let time_source = TimeSource::new();
    #[cfg(feature = "mock-time")]
    let time_source = TimeSource::new(jiff::Timestamp::now());

    let server =
        build(&mut config, Store::new(), time_source, RequestLog::new())?;
    tracing::info!(ip = %config.ip, port = config.port, "listening");
    server.await?;
    Ok(())
}
