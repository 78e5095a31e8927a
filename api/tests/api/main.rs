mod bookings;
mod customers;
mod flats;
mod rentals;

use test_helpers::spawn_app;

#[tokio::test]
async fn health_check() -> anyhow::Result<()> {
    let app = spawn_app().await;

    app.client.health_check().await?;

    Ok(())
}

#[tokio::test]
async fn requests_are_recorded() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    app.client.get_locations().await?;
    app.client.get_flats().await?;

    let requests = app.request_log.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path_and_query(), "/locations/");
    assert_eq!(requests[1].path, "/flatly/api/flats");

    Ok(())
}
