use payloads::requests::UpdateFlat;
use payloads::{FlatFilter, FlatId, Lookup, SortOrder};
use query::hooks::{use_flat, use_flats, use_infinite_flats, use_update_flat};
use query::{FetchNext, PageSizes, QueryClient};
use rust_decimal::Decimal;

use test_helpers::spawn_app;

const FLATS_PATH: &str = "/flatly/api/flats";

#[tokio::test]
async fn flats_are_filtered_on_the_client() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let filter = FlatFilter {
        query: Some("warsaw".into()),
        max_price: Some(Decimal::from(140)),
        sort: SortOrder::PriceAscending,
        ..Default::default()
    };
    let flats = use_flats(&app.query, filter).fetch().await?;
    let ids: Vec<FlatId> = flats.iter().map(|flat| flat.id).collect();
    assert_eq!(ids, vec![FlatId(4), FlatId(1), FlatId(7)]);

    let all = use_flats(&app.query, FlatFilter::default()).fetch().await?;
    assert_eq!(all.len(), 8);
    // one request per distinct filter
    assert_eq!(app.request_log.count("GET", FLATS_PATH), 2);

    Ok(())
}

#[tokio::test]
async fn infinite_flats_share_one_full_list() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();
    let client = QueryClient::new(app.client.clone()).with_page_sizes(
        PageSizes {
            flats: 3,
            ..Default::default()
        },
    );

    let flats = use_infinite_flats(&client, FlatFilter::default());
    flats.fetch().await?;
    while flats.fetch_next_page().await? == FetchNext::Fetched {}
    assert_eq!(flats.items().len(), 8);
    assert_eq!(flats.data().map(|data| data.pages.len()), Some(3));
    assert_eq!(app.request_log.count("GET", FLATS_PATH), 1);

    // a different filter is a new sequence starting from its first page
    let filter = FlatFilter {
        query: Some("Gdansk".into()),
        ..Default::default()
    };
    let gdansk = use_infinite_flats(&client, filter);
    let first = gdansk.fetch().await?;
    assert_eq!(first.pages.len(), 1);
    assert_eq!(first.items().count(), 2);
    assert!(!gdansk.has_next_page());
    assert_eq!(flats.items().len(), 8);

    Ok(())
}

#[tokio::test]
async fn update_invalidates_the_flat_and_lists() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let all = use_flats(&app.query, FlatFilter::default());
    let flat = use_flat(&app.query, Some(FlatId(5)));
    let other = use_flat(&app.query, Some(FlatId(6)));
    all.fetch().await?;
    flat.fetch().await?;
    other.fetch().await?;

    let details = UpdateFlat {
        name: Some("Renovated family house".into()),
        ..Default::default()
    };
    let updated = use_update_flat(&app.query)
        .mutate((FlatId(5), details))
        .await?;
    assert_eq!(updated.name, "Renovated family house");

    assert!(all.state().is_stale);
    assert!(flat.state().is_stale);
    assert!(!other.state().is_stale);
    assert_eq!(flat.fetch().await?, Lookup::Found(updated.clone()));
    assert!(all.fetch().await?.contains(&updated));

    Ok(())
}

#[tokio::test]
async fn missing_flat_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let flat = use_flat(&app.query, Some(FlatId(404)));
    assert_eq!(flat.fetch().await?, Lookup::NotFound);
    assert!(flat.state().error.is_none());

    Ok(())
}

#[tokio::test]
async fn short_search_reuses_the_full_list() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let all = use_flats(&app.query, FlatFilter::default()).fetch().await?;
    let short = FlatFilter {
        query: Some("wa".into()),
        ..Default::default()
    };
    assert!(!short.is_active());
    let flats = use_flats(&app.query, short).fetch().await?;
    assert_eq!(flats, all);
    assert_eq!(app.request_log.count("GET", FLATS_PATH), 1);

    Ok(())
}

#[tokio::test]
async fn stay_period_hides_unavailable_flats() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let details = UpdateFlat {
        availability: Some("unavailable".into()),
        ..Default::default()
    };
    use_update_flat(&app.query).mutate((FlatId(3), details)).await?;

    let period = FlatFilter {
        available_from: Some("2025-02-01".parse()?),
        available_to: Some("2025-02-07".parse()?),
        ..Default::default()
    };
    let flats = use_flats(&app.query, period.clone()).fetch().await?;
    assert_eq!(flats.len(), 7);
    assert!(flats.iter().all(|flat| flat.id != FlatId(3)));

    let inverted = FlatFilter {
        available_from: period.available_to,
        available_to: period.available_from,
        ..Default::default()
    };
    assert!(use_flats(&app.query, inverted).fetch().await?.is_empty());

    Ok(())
}
