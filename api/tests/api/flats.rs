use payloads::FlatId;
use payloads::requests::UpdateFlat;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use test_helpers::{assert_status_code, spawn_app};

#[tokio::test]
async fn flats_are_listed_in_full() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();

    let flats = app.client.get_flats().await?;
    assert_eq!(flats, dataset.flats);

    let flat = app.client.get_flat(&FlatId(7)).await?;
    assert_eq!(Some(&flat), dataset.flat(7));

    let result = app.client.get_flat(&FlatId(70)).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn update_flat_changes_only_given_fields() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    let before = dataset.flat(3).cloned().expect("seeded flat");

    let details = UpdateFlat {
        price: Some(Decimal::from(199)),
        amenities: Some(vec!["wifi".into(), "sauna".into()]),
        ..Default::default()
    };
    let updated = app.client.update_flat(&before.id, &details).await?;
    assert_eq!(updated.price, Decimal::from(199));
    assert_eq!(updated.amenities, vec!["wifi", "sauna"]);
    assert_eq!(updated.name, before.name);
    assert_eq!(updated.distance, before.distance);

    assert_eq!(app.client.get_flat(&before.id).await?, updated);

    let result = app.client.update_flat(&FlatId(99), &details).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}
