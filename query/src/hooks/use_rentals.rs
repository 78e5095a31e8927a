use payloads::requests::CreateRental;
use payloads::{CarId, Lookup, Page, PageRequest, Rental, RentalId};

use super::{PageSize, Query, invalid_input, lookup};
use crate::resources::{CAR, CARS, RENTAL, RENTALS};
use crate::{
    InfiniteData, InfiniteQuery, Mutation, QueryClient, QueryError,
    QueryFilter, QueryKey,
};

/// One page of the logged in customer's rentals.
pub fn use_rentals(
    client: &QueryClient,
    page: PageRequest,
) -> Query<Page<Rental>> {
    let api = client.api().clone();
    Query::new(client, QueryKey::with_params(RENTALS, &page), move || {
        let api = api.clone();
        async move { api.get_rentals(page).await.map_err(QueryError::from) }
    })
}

pub fn use_infinite_rentals(client: &QueryClient) -> InfiniteQuery<Rental> {
    let size = client.page_sizes().rentals;
    let api = client.api().clone();
    InfiniteQuery::new(
        client,
        QueryKey::with_params(RENTALS, &PageSize(size)),
        size,
        move |request| {
            let api = api.clone();
            async move {
                api.get_rentals(request).await.map_err(QueryError::from)
            }
        },
    )
}

pub fn use_rental(
    client: &QueryClient,
    rental_id: Option<RentalId>,
) -> Query<Lookup<Rental>> {
    let Some(rental_id) = rental_id else {
        return Query::disabled(client);
    };
    let api = client.api().clone();
    Query::new(client, QueryKey::entity(RENTAL, rental_id), move || {
        let api = api.clone();
        async move { lookup(api.get_rental(&rental_id).await) }
    })
}

/// Rent a car. Invalidates the car lists, the rented car and the rentals.
pub fn use_rent_car(client: &QueryClient) -> Mutation<CreateRental, Rental> {
    Mutation::new(
        client,
        |client: QueryClient, details: CreateRental| async move {
            if !details.is_valid() {
                return Err(invalid_input(
                    "The rental must end after it starts",
                ));
            }
            client
                .api()
                .create_rental(&details)
                .await
                .map_err(QueryError::from)
        },
        |_, details, _| {
            vec![
                QueryFilter::resource(CARS),
                QueryFilter::entity(CAR, details.car_id),
                QueryFilter::resource(RENTALS),
            ]
        },
    )
}

/// Cancel a rental. The car it was for becomes available again, so the car
/// lists and that car are invalidated along with the rentals. The car is
/// taken from cached rental data; if no cached rental mentions it, every
/// cached car is invalidated.
pub fn use_cancel_rental(client: &QueryClient) -> Mutation<RentalId, ()> {
    Mutation::new(
        client,
        |client: QueryClient, rental_id: RentalId| async move {
            client
                .api()
                .cancel_rental(&rental_id)
                .await
                .map_err(QueryError::from)
        },
        |client, rental_id, _| {
            let car = match cached_car_id(client, *rental_id) {
                Some(car_id) => QueryFilter::entity(CAR, car_id),
                None => QueryFilter::resource(CAR),
            };
            vec![
                QueryFilter::resource(CARS),
                car,
                QueryFilter::resource(RENTALS),
                QueryFilter::entity(RENTAL, rental_id),
            ]
        },
    )
}

fn cached_car_id(client: &QueryClient, rental_id: RentalId) -> Option<CarId> {
    let entity = QueryKey::entity(RENTAL, rental_id);
    if let Some(Lookup::Found(rental)) =
        client.get_query_data::<Lookup<Rental>>(&entity)
    {
        return Some(rental.car.id);
    }
    client
        .cached_keys(&QueryFilter::resource(RENTALS))
        .iter()
        .find_map(|key| {
            let rentals: Vec<Rental> =
                match client.get_query_data::<Page<Rental>>(key) {
                    Some(page) => page.content,
                    None => client
                        .get_query_data::<InfiniteData<Rental>>(key)?
                        .items()
                        .cloned()
                        .collect(),
                };
            rentals
                .into_iter()
                .find(|rental| rental.id == rental_id)
                .map(|rental| rental.car.id)
        })
}
