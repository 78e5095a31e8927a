//! Development server for front-end work against the rental api
//!
//! Runs the in-memory api on a fixed port, seeded with the demo cars,
//! locations and flats. Time is mocked by the api, so a background task
//! keeps it in sync with the real clock.
//!
//! Usage: PORT=8000 cargo run -p dev-server

use anyhow::Result;
use api::telemetry::log_error;
use api::{Config, RequestLog, Store, time::TimeSource};
use jiff::Timestamp;
use std::time::Duration;
use test_helpers::mock::DevDataset;
use tokio::time::interval;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // This will silently ignore if the file doesn't exist
    let _ = dotenvy::dotenv();

    let subscriber = api::telemetry::get_subscriber("info".into());
    api::telemetry::init_subscriber(subscriber)?;

    info!("🚀 Starting rental development server");

    let mut config = Config::from_env()?;
    let store = Store::new();
    let time_source = TimeSource::new(Timestamp::now());

    let dataset = DevDataset::seed(&store);
    let server = api::build(
        &mut config,
        store,
        time_source.clone(),
        RequestLog::new(),
    )?;
    let server_handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = server.await {
            log_error(e);
        }
    });

    start_time_sync_task(time_source);

    info!("🎯 Development server ready!");
    info!("   API: http://{}:{}", config.ip, config.port);
    info!("   Client: RENTAL_API_URL=http://{}:{}", config.ip, config.port);
    dataset.print_summary();
    info!("👋 Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down development server");
    server_handle.stop(true).await;
    Ok(())
}

/// Keep the mocked time source following the real clock, so that "active"
/// bookings and rentals move with the wall clock.
fn start_time_sync_task(time_source: TimeSource) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let real_now = Timestamp::now();
            time_source.set(real_now);

            if real_now.as_second() % 60 == 0 {
                tracing::debug!(
                    "🕐 Synced mock time to real time: {}",
                    real_now
                );
            }
        }
    });
}
