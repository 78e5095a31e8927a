use jiff::{Span, Timestamp};
use payloads::requests::CreateRental;
use payloads::{CarFilter, CarId, PageRequest, RentalId};
use reqwest::StatusCode;
use uuid::Uuid;

use test_helpers::{TestApp, assert_status_code, spawn_app};

fn rental_for(
    app: &TestApp,
    car_id: CarId,
    start_days: i64,
    days: i64,
) -> CreateRental {
    let now: Timestamp = app.time_source.now();
    let start_at = now + Span::new().hours(24 * start_days);
    CreateRental {
        car_id,
        start_at,
        end_at: start_at + Span::new().hours(24 * days),
    }
}

#[tokio::test]
async fn rentals_require_a_token() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();

    let result = app.client.get_rentals(PageRequest::first(5)).await;
    assert_status_code(result, StatusCode::UNAUTHORIZED);

    let details = rental_for(&app, dataset.cars[0].id, 1, 2);
    let result = app.client.create_rental(&details).await;
    assert_status_code(result, StatusCode::UNAUTHORIZED);

    // an unknown token is no better than none
    app.client.session.set_token("not-a-token");
    let result = app.client.get_rentals(PageRequest::first(5)).await;
    assert_status_code(result, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn rent_list_and_cancel() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    let auth = app.register_alice().await?;

    let car = &dataset.cars[0];
    let rental = app
        .client
        .create_rental(&rental_for(&app, car.id, 1, 3))
        .await?;
    assert_eq!(rental.car.id, car.id);
    assert_eq!(rental.customer.email, auth.email);
    assert!(!rental.is_cancelled);

    let page = app.client.get_rentals(PageRequest::first(5)).await?;
    assert_eq!(page.content, vec![rental.clone()]);
    assert_eq!(app.client.get_rental(&rental.id).await?, rental);

    app.client.cancel_rental(&rental.id).await?;
    let cancelled = app.client.get_rental(&rental.id).await?;
    assert!(cancelled.is_cancelled);

    // cancelling again is fine
    app.client.cancel_rental(&rental.id).await?;

    let result = app.client.get_rental(&RentalId(Uuid::new_v4())).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn overlapping_rentals_conflict() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let car_id = dataset.cars[0].id;

    let first = app
        .client
        .create_rental(&rental_for(&app, car_id, 1, 3))
        .await?;

    let result = app
        .client
        .create_rental(&rental_for(&app, car_id, 2, 3))
        .await;
    assert_status_code(result, StatusCode::CONFLICT);

    // back to back is not an overlap
    app.client
        .create_rental(&rental_for(&app, car_id, 4, 1))
        .await?;

    // a cancelled rental frees the car
    app.client.cancel_rental(&first.id).await?;
    app.client
        .create_rental(&rental_for(&app, car_id, 2, 1))
        .await?;

    Ok(())
}

#[tokio::test]
async fn invalid_rentals_are_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;

    let mut details = rental_for(&app, dataset.cars[0].id, 2, 1);
    details.end_at = details.start_at;
    let result = app.client.create_rental(&details).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    let details = rental_for(&app, CarId(Uuid::new_v4()), 1, 1);
    let result = app.client.create_rental(&details).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn rentals_are_private_to_the_customer() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let rental = app
        .client
        .create_rental(&rental_for(&app, dataset.cars[1].id, 1, 1))
        .await?;

    let bob = app.new_client();
    bob.register(&payloads::requests::CustomerEmail::new("bob@example.com"))
        .await?;
    let page = bob.get_rentals(PageRequest::first(5)).await?;
    assert!(page.content.is_empty());
    assert_status_code(bob.get_rental(&rental.id).await, StatusCode::NOT_FOUND);
    assert_status_code(
        bob.cancel_rental(&rental.id).await,
        StatusCode::NOT_FOUND,
    );

    Ok(())
}

#[tokio::test]
async fn rented_cars_are_hidden_for_the_period() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let car = dataset.cars_in("Krakow")[0].clone();
    let details = rental_for(&app, car.id, 1, 2);
    app.client.create_rental(&details).await?;

    let during = CarFilter {
        available_from: Some(details.start_at),
        available_to: Some(details.end_at),
        ..CarFilter::city("Krakow")
    };
    let page = app.client.get_cars(PageRequest::first(10), &during).await?;
    assert!(page.content.iter().all(|c| c.id != car.id));
    assert_eq!(page.content.len(), 1);

    let after = CarFilter {
        available_from: Some(details.end_at),
        ..CarFilter::city("Krakow")
    };
    let page = app.client.get_cars(PageRequest::first(10), &after).await?;
    assert_eq!(page.content.len(), 2);

    Ok(())
}
