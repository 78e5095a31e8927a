use payloads::{CarFilter, CarId, Lookup, PageRequest};
use query::hooks::{
    use_car, use_cars, use_cities, use_infinite_cars, use_locations,
};
use query::{FetchNext, PageSizes, QueryClient, QueryError, QueryFilter};
use uuid::Uuid;

use test_helpers::spawn_app;

const WARSAW_PAGE: &str = "/cars/?page=0&size=10&city=Warsaw";

#[tokio::test]
async fn identical_queries_share_one_request() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let warsaw = || {
        use_cars(&app.query, PageRequest::first(10), CarFilter::city("Warsaw"))
    };
    let (a, b) = (warsaw(), warsaw());
    let (a, b) = tokio::join!(a.fetch(), b.fetch());
    let (a, b) = (a?, b?);
    assert_eq!(a, b);
    assert_eq!(a.content.len(), 4);
    assert_eq!(app.requests_for("GET", WARSAW_PAGE), 1);

    // fresh data is served from the cache
    let again = warsaw();
    assert_eq!(again.fetch().await?, a);
    assert_eq!(app.requests_for("GET", WARSAW_PAGE), 1);

    app.query.invalidate_queries(&QueryFilter::resource("cars"));
    assert!(again.state().is_stale);
    again.fetch().await?;
    assert_eq!(app.requests_for("GET", WARSAW_PAGE), 2);
    assert!(!again.state().is_stale);

    Ok(())
}

#[tokio::test]
async fn infinite_cars_append_pages() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();
    let client = QueryClient::new(app.client.clone()).with_page_sizes(
        PageSizes {
            cars: 3,
            ..Default::default()
        },
    );

    let cars = use_infinite_cars(&client, CarFilter::default());
    let first = cars.fetch().await?;
    assert_eq!(first.items().count(), 3);
    assert!(cars.has_next_page());

    assert_eq!(cars.fetch_next_page().await?, FetchNext::Fetched);
    assert_eq!(cars.items().len(), 6);
    assert_eq!(cars.fetch_next_page().await?, FetchNext::Fetched);
    assert_eq!(cars.items().len(), 7);
    assert!(!cars.has_next_page());
    assert_eq!(app.request_log.count("GET", "/cars/"), 3);

    // past the last page nothing is requested and nothing changes
    let before = cars.data();
    assert_eq!(cars.fetch_next_page().await?, FetchNext::NoMorePages);
    assert_eq!(app.request_log.count("GET", "/cars/"), 3);
    assert_eq!(cars.data(), before);

    // every car appears once
    let mut ids: Vec<CarId> = cars.items().iter().map(|car| car.id).collect();
    ids.sort_by_key(|id| id.0);
    ids.dedup();
    assert_eq!(ids.len(), 7);

    Ok(())
}

#[tokio::test]
async fn next_page_while_fetching_is_dropped() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();
    let client = QueryClient::new(app.client.clone()).with_page_sizes(
        PageSizes {
            cars: 2,
            ..Default::default()
        },
    );
    let cars = use_infinite_cars(&client, CarFilter::default());
    cars.fetch().await?;

    let (a, b) = tokio::join!(cars.fetch_next_page(), cars.fetch_next_page());
    assert_eq!(a?, FetchNext::Fetched);
    assert_eq!(b?, FetchNext::AlreadyFetching);
    assert_eq!(cars.items().len(), 4);
    assert_eq!(app.request_log.count("GET", "/cars/"), 2);

    Ok(())
}

#[tokio::test]
async fn filter_change_starts_a_new_sequence() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();
    let client = QueryClient::new(app.client.clone()).with_page_sizes(
        PageSizes {
            cars: 2,
            ..Default::default()
        },
    );

    let warsaw = use_infinite_cars(&client, CarFilter::city("Warsaw"));
    warsaw.fetch().await?;
    warsaw.fetch_next_page().await?;
    assert_eq!(warsaw.items().len(), 4);

    let krakow = use_infinite_cars(&client, CarFilter::city("Krakow"));
    assert_ne!(krakow.key(), warsaw.key());
    let first = krakow.fetch().await?;
    assert_eq!(first.pages.len(), 1);
    assert_eq!(first.pages[0].page.number, 0);
    assert_eq!(
        app.requests_for("GET", "/cars/?page=0&size=2&city=Krakow"),
        1
    );

    // the old filter's pages are still there, and an equal filter built
    // from scratch finds them
    let warsaw_again = use_infinite_cars(&client, CarFilter::city("Warsaw"));
    assert_eq!(warsaw_again.key(), warsaw.key());
    assert_eq!(warsaw_again.fetch().await?.items().count(), 4);
    assert_eq!(app.request_log.count("GET", "/cars/"), 3);

    Ok(())
}

#[tokio::test]
async fn car_lookups() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dataset = app.seed();
    let expected = dataset.cars[0].clone();

    let car = use_car(&app.query, Some(expected.id)).fetch().await?;
    assert_eq!(car, Lookup::Found(expected));

    let missing = use_car(&app.query, Some(CarId(Uuid::new_v4())));
    assert_eq!(missing.fetch().await?, Lookup::NotFound);

    let disabled = use_car(&app.query, None);
    assert!(!disabled.is_enabled());
    assert!(matches!(disabled.fetch().await, Err(QueryError::Disabled)));
    assert!(disabled.spawn().is_none());
    assert_eq!(app.request_log.requests().len(), 2);

    Ok(())
}

#[tokio::test]
async fn cities_come_from_the_cached_locations() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let cities = use_cities(&app.query).fetch().await?;
    assert_eq!(cities, vec!["Gdansk", "Krakow", "Warsaw"]);

    use_locations(&app.query).fetch().await?;
    assert_eq!(app.request_log.count("GET", "/locations/"), 1);

    Ok(())
}

#[tokio::test]
async fn spawned_query_can_be_aborted() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.seed();

    let cars =
        use_cars(&app.query, PageRequest::first(10), CarFilter::default());
    let task = cars.spawn().expect("enabled query");
    task.abort();
    assert!(matches!(task.join().await, Err(QueryError::Cancelled)));

    // the shared request is not poisoned by the abandoned observer
    let page = cars.fetch().await?;
    assert_eq!(page.content.len(), 7);
    assert_eq!(app.request_log.count("GET", "/cars/"), 1);

    Ok(())
}
