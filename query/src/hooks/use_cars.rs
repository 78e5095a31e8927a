use payloads::{Car, CarFilter, CarId, LocationData, Lookup, Page, PageRequest};

use super::{PageSize, Query, lookup};
use crate::resources::{CAR, CARS, CITIES, LOCATIONS};
use crate::{InfiniteQuery, QueryClient, QueryError, QueryKey};

/// One page of cars.
pub fn use_cars(
    client: &QueryClient,
    page: PageRequest,
    filter: CarFilter,
) -> Query<Page<Car>> {
    let key = QueryKey::with_params(CARS, &(page, filter.clone()));
    let api = client.api().clone();
    Query::new(client, key, move || {
        let api = api.clone();
        let filter = filter.clone();
        async move {
            api.get_cars(page, &filter).await.map_err(QueryError::from)
        }
    })
}

/// Cars matching the filter, loaded one page at a time.
pub fn use_infinite_cars(
    client: &QueryClient,
    filter: CarFilter,
) -> InfiniteQuery<Car> {
    let size = client.page_sizes().cars;
    let key = QueryKey::with_params(CARS, &(PageSize(size), filter.clone()));
    let api = client.api().clone();
    InfiniteQuery::new(client, key, size, move |request| {
        let api = api.clone();
        let filter = filter.clone();
        async move {
            api.get_cars(request, &filter).await.map_err(QueryError::from)
        }
    })
}

pub fn use_car(
    client: &QueryClient,
    car_id: Option<CarId>,
) -> Query<Lookup<Car>> {
    let Some(car_id) = car_id else {
        return Query::disabled(client);
    };
    let api = client.api().clone();
    Query::new(client, QueryKey::entity(CAR, car_id), move || {
        let api = api.clone();
        async move { lookup(api.get_car(&car_id).await) }
    })
}

pub fn use_locations(client: &QueryClient) -> Query<Vec<LocationData>> {
    let api = client.api().clone();
    Query::new(client, QueryKey::new(LOCATIONS), move || {
        let api = api.clone();
        async move { api.get_locations().await.map_err(QueryError::from) }
    })
}

/// Distinct city names of all locations, sorted, for the city filter.
pub fn use_cities(client: &QueryClient) -> Query<Vec<String>> {
    let locations = use_locations(client);
    Query::new(client, QueryKey::new(CITIES), move || {
        let locations = locations.clone();
        async move {
            let mut cities: Vec<String> = locations
                .fetch()
                .await?
                .iter()
                .filter_map(LocationData::city)
                .collect();
            cities.sort();
            cities.dedup();
            Ok::<_, QueryError>(cities)
        }
    })
}
