use jiff::{Span, civil::date};
use payloads::requests::CreateBooking;
use payloads::{BookingId, FlatId};
use reqwest::StatusCode;

use test_helpers::{assert_status_code, spawn_app};

const EMAIL: &str = "guest@example.com";

#[tokio::test]
async fn create_and_list_active_bookings() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();

    // the mocked clock starts on 2025-01-01
    let details = CreateBooking::new(
        FlatId(7),
        EMAIL,
        date(2025, 1, 3),
        date(2025, 1, 6),
    );
    let booking = app.client.create_booking(&details).await?;
    assert_eq!(booking.flat_id, FlatId(7));
    assert_eq!(booking.user_email, EMAIL);
    assert_eq!(booking.system, "MOBILE");

    let active = app.client.get_active_bookings(EMAIL).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, booking.id);
    assert_eq!(Some(&active[0].flat), dataset.flat(7));

    assert!(app.client.get_active_bookings("x@y.com").await?.is_empty());

    // the booking stays active through its last day
    app.time_source.advance(Span::new().hours(24 * 5));
    assert_eq!(app.client.get_active_bookings(EMAIL).await?.len(), 1);
    app.time_source.advance(Span::new().hours(24));
    assert!(app.client.get_active_bookings(EMAIL).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn overlapping_bookings_conflict() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let first = CreateBooking::new(
        FlatId(2),
        EMAIL,
        date(2025, 2, 1),
        date(2025, 2, 5),
    );
    let booking = app.client.create_booking(&first).await?;

    let second = CreateBooking::new(
        FlatId(2),
        "other@example.com",
        date(2025, 2, 5),
        date(2025, 2, 9),
    );
    let result = app.client.create_booking(&second).await;
    assert_status_code(result, StatusCode::CONFLICT);

    // another flat is free
    let elsewhere = CreateBooking {
        flat_id: FlatId(3),
        ..second.clone()
    };
    app.client.create_booking(&elsewhere).await?;

    app.client.delete_booking(&booking.id).await?;
    app.client.create_booking(&second).await?;

    Ok(())
}

#[tokio::test]
async fn invalid_bookings_are_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let backwards = CreateBooking::new(
        FlatId(1),
        EMAIL,
        date(2025, 3, 5),
        date(2025, 3, 1),
    );
    let result = app.client.create_booking(&backwards).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    let no_email = CreateBooking::new(
        FlatId(1),
        "",
        date(2025, 3, 1),
        date(2025, 3, 5),
    );
    let result = app.client.create_booking(&no_email).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    let no_flat = CreateBooking::new(
        FlatId(50),
        EMAIL,
        date(2025, 3, 1),
        date(2025, 3, 5),
    );
    let result = app.client.create_booking(&no_flat).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn deleting_an_unknown_booking_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app.client.delete_booking(&BookingId(42)).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}
