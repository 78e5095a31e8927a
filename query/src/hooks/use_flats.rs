use payloads::requests::UpdateFlat;
use payloads::{Flat, FlatFilter, FlatId, Lookup, Page};

use super::{PageSize, Query, lookup};
use crate::resources::{FLAT, FLATS};
use crate::{
    InfiniteQuery, Mutation, QueryClient, QueryError, QueryFilter, QueryKey,
};

/// Flats matching the filter, in the filter's sort order.
///
/// The flats service only returns the full list, so filtering and sorting
/// happen here. The result is cached per filter; filters that do not narrow
/// the list share the entry of the default filter.
pub fn use_flats(
    client: &QueryClient,
    filter: FlatFilter,
) -> Query<Vec<Flat>> {
    let filter = canonical(filter);
    let key = QueryKey::with_params(FLATS, &filter);
    let api = client.api().clone();
    Query::new(client, key, move || {
        let api = api.clone();
        let filter = filter.clone();
        async move {
            let flats = api.get_flats().await?;
            Ok::<_, QueryError>(filter.apply(&flats))
        }
    })
}

/// Filtered flats, revealed one page at a time.
///
/// Pages are cut from the cached result of [`use_flats`] for the same
/// filter, so the full list is requested once per sequence.
pub fn use_infinite_flats(
    client: &QueryClient,
    filter: FlatFilter,
) -> InfiniteQuery<Flat> {
    let filter = canonical(filter);
    let size = client.page_sizes().flats;
    let key = QueryKey::with_params(FLATS, &(PageSize(size), filter.clone()));
    let flats = use_flats(client, filter);
    InfiniteQuery::new(client, key, size, move |request| {
        let flats = flats.clone();
        async move {
            let flats = flats.fetch().await?;
            Ok::<_, QueryError>(Page::from_items(&flats, request))
        }
    })
}

pub fn use_flat(
    client: &QueryClient,
    flat_id: Option<FlatId>,
) -> Query<Lookup<Flat>> {
    let Some(flat_id) = flat_id else {
        return Query::disabled(client);
    };
    let api = client.api().clone();
    Query::new(client, QueryKey::entity(FLAT, flat_id), move || {
        let api = api.clone();
        async move { lookup(api.get_flat(&flat_id).await) }
    })
}

pub fn use_update_flat(
    client: &QueryClient,
) -> Mutation<(FlatId, UpdateFlat), Flat> {
    Mutation::new(
        client,
        |client: QueryClient, (flat_id, details): (FlatId, UpdateFlat)| {
            async move {
                client
                    .api()
                    .update_flat(&flat_id, &details)
                    .await
                    .map_err(QueryError::from)
            }
        },
        |_, (flat_id, _), _| {
            vec![
                QueryFilter::resource(FLATS),
                QueryFilter::entity(FLAT, flat_id),
            ]
        },
    )
}

fn canonical(filter: FlatFilter) -> FlatFilter {
    if filter.is_active() {
        filter
    } else {
        FlatFilter::default()
    }
}
