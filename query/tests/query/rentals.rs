use jiff::{Span, Timestamp};
use payloads::requests::CreateRental;
use payloads::{CarFilter, CarId, Lookup, PageRequest};
use query::hooks::{
    use_cancel_rental, use_car, use_cars, use_infinite_rentals,
    use_locations, use_rent_car, use_rental, use_rentals,
};
use query::{MutationState, QueryError};
use reqwest::StatusCode;

use test_helpers::{TestApp, assert_query_status_code, spawn_app};

fn rental_for(app: &TestApp, car_id: CarId, start_days: i64) -> CreateRental {
    let now: Timestamp = app.time_source.now();
    let start_at = now + Span::new().hours(24 * start_days);
    CreateRental {
        car_id,
        start_at,
        end_at: start_at + Span::new().hours(48),
    }
}

#[tokio::test]
async fn renting_invalidates_cars_and_rentals() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let car = dataset.cars[0].clone();

    let cars =
        use_cars(&app.query, PageRequest::first(10), CarFilter::default());
    let rented_car = use_car(&app.query, Some(car.id));
    let other_car = use_car(&app.query, Some(dataset.cars[1].id));
    let rentals = use_rentals(&app.query, PageRequest::first(5));
    let locations = use_locations(&app.query);
    cars.fetch().await?;
    rented_car.fetch().await?;
    other_car.fetch().await?;
    assert!(rentals.fetch().await?.content.is_empty());
    locations.fetch().await?;

    let rent = use_rent_car(&app.query);
    let rental = rent.mutate(rental_for(&app, car.id, 1)).await?;
    assert!(matches!(rent.state(), MutationState::Success(_)));

    assert!(cars.state().is_stale);
    assert!(rented_car.state().is_stale);
    assert!(rentals.state().is_stale);
    assert!(!other_car.state().is_stale);
    assert!(!locations.state().is_stale);

    // stale data is still shown until the refetch lands
    assert!(rentals.state().data.is_fetched());
    assert_eq!(rentals.fetch().await?.content, vec![rental]);
    assert_eq!(app.request_log.count("GET", "/rentals/"), 2);

    Ok(())
}

#[tokio::test]
async fn cancelling_invalidates_the_rented_car() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let car = dataset.cars[2].clone();
    let rental = use_rent_car(&app.query)
        .mutate(rental_for(&app, car.id, 2))
        .await?;

    let rentals = use_infinite_rentals(&app.query);
    assert_eq!(rentals.fetch().await?.items().count(), 1);
    let rented_car = use_car(&app.query, Some(car.id));
    let other_car = use_car(&app.query, Some(dataset.cars[3].id));
    let cached_rental = use_rental(&app.query, Some(rental.id));
    rented_car.fetch().await?;
    other_car.fetch().await?;
    cached_rental.fetch().await?;

    use_cancel_rental(&app.query).mutate(rental.id).await?;

    // the car is known from the cached rental, so only it is invalidated
    assert!(rented_car.state().is_stale);
    assert!(!other_car.state().is_stale);
    assert!(rentals.state().is_stale);
    assert!(cached_rental.state().is_stale);

    let Lookup::Found(cancelled) = cached_rental.fetch().await? else {
        panic!("rental should still exist");
    };
    assert!(cancelled.is_cancelled);

    Ok(())
}

#[tokio::test]
async fn cancelling_an_uncached_rental_invalidates_every_car()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let rental = app
        .client
        .create_rental(&rental_for(&app, dataset.cars[0].id, 1))
        .await?;

    let other_car = use_car(&app.query, Some(dataset.cars[4].id));
    other_car.fetch().await?;

    use_cancel_rental(&app.query).mutate(rental.id).await?;
    assert!(other_car.state().is_stale);

    Ok(())
}

#[tokio::test]
async fn invalid_rental_is_not_sent() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let cars =
        use_cars(&app.query, PageRequest::first(10), CarFilter::default());
    cars.fetch().await?;

    let mut details = rental_for(&app, dataset.cars[0].id, 1);
    details.end_at = details.start_at;
    let rent = use_rent_car(&app.query);
    let result = rent.mutate(details).await;
    assert!(matches!(result, Err(QueryError::InvalidInput(_))));
    assert!(rent.state().error().is_some());
    assert_eq!(app.request_log.count("POST", "/rentals/"), 0);
    assert!(!cars.state().is_stale);

    Ok(())
}

#[tokio::test]
async fn failed_rental_leaves_the_cache_alone() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    app.register_alice().await?;
    let car_id = dataset.cars[0].id;
    app.client.create_rental(&rental_for(&app, car_id, 1)).await?;

    let rentals = use_rentals(&app.query, PageRequest::first(5));
    rentals.fetch().await?;

    let result = use_rent_car(&app.query)
        .mutate(rental_for(&app, car_id, 2))
        .await;
    assert_query_status_code(result.clone(), StatusCode::CONFLICT);
    let message = result.unwrap_err().user_message();
    assert_eq!(message, "Email already exists or invalid credentials.");
    assert!(!rentals.state().is_stale);

    Ok(())
}

#[tokio::test]
async fn rentals_without_login_end_in_error_state() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let rentals = use_rentals(&app.query, PageRequest::first(5));
    let result = rentals.fetch().await;
    assert_query_status_code(result, StatusCode::UNAUTHORIZED);

    let state = rentals.state();
    assert_eq!(state.status, query::QueryStatus::Error);
    assert!(state.error.is_some());
    assert!(!state.data.is_fetched());

    Ok(())
}
