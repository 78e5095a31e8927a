use payloads::requests::{CreateBooking, validate_email};
use payloads::{Booking, BookingId, FlatBooking, FlatId, Lookup, QueryParams};

use super::{Query, invalid_input};
use crate::resources::{BOOKINGS, FLAT, FLATS};
use crate::{Mutation, QueryClient, QueryError, QueryFilter, QueryKey};

struct BookingParams<'a> {
    user_email: &'a str,
    flat_id: Option<FlatId>,
}

impl QueryParams for BookingParams<'_> {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("userEmail", self.user_email.to_string())];
        if let Some(flat_id) = self.flat_id {
            pairs.push(("flatId", flat_id.to_string()));
        }
        pairs
    }
}

/// Bookings of the user that have not ended, with their flats. Disabled
/// until there is an email to ask for.
pub fn use_active_bookings(
    client: &QueryClient,
    user_email: Option<&str>,
) -> Query<Vec<FlatBooking>> {
    let Some(user_email) = user_email.map(str::trim).filter(|e| !e.is_empty())
    else {
        return Query::disabled(client);
    };
    let key = QueryKey::with_params(
        BOOKINGS,
        &BookingParams {
            user_email,
            flat_id: None,
        },
    );
    let api = client.api().clone();
    let user_email = user_email.to_string();
    Query::new(client, key, move || {
        let api = api.clone();
        let user_email = user_email.clone();
        async move {
            api.get_active_bookings(&user_email)
                .await
                .map_err(QueryError::from)
        }
    })
}

/// The user's active booking of one flat, if there is one.
pub fn use_booking_for_flat(
    client: &QueryClient,
    user_email: Option<&str>,
    flat_id: FlatId,
) -> Query<Lookup<FlatBooking>> {
    let bookings = use_active_bookings(client, user_email);
    let Some(user_email) = user_email.filter(|_| bookings.is_enabled()) else {
        return Query::disabled(client);
    };
    let key = QueryKey::with_params(
        BOOKINGS,
        &BookingParams {
            user_email: user_email.trim(),
            flat_id: Some(flat_id),
        },
    );
    Query::new(client, key, move || {
        let bookings = bookings.clone();
        async move {
            let booking = bookings
                .fetch()
                .await?
                .into_iter()
                .find(|booking| booking.flat.id == flat_id);
            Ok::<_, QueryError>(Lookup::from(booking))
        }
    })
}

/// Book a flat. Invalidates the bookings, the flat lists and the flat.
pub fn use_create_booking(
    client: &QueryClient,
) -> Mutation<CreateBooking, Booking> {
    Mutation::new(
        client,
        |client: QueryClient, details: CreateBooking| async move {
            if let Some(message) =
                validate_email(&details.user_email).error_message()
            {
                return Err(invalid_input(message));
            }
            if !details.is_valid() {
                return Err(invalid_input(
                    "The booking must not end before it starts",
                ));
            }
            client
                .api()
                .create_booking(&details)
                .await
                .map_err(QueryError::from)
        },
        |_, details, _| {
            vec![
                QueryFilter::resource(BOOKINGS),
                QueryFilter::resource(FLATS),
                QueryFilter::entity(FLAT, details.flat_id),
            ]
        },
    )
}

/// Cancel a booking. The flat is taken from cached bookings; if none of
/// them mentions the booking, every cached flat is invalidated.
pub fn use_delete_booking(client: &QueryClient) -> Mutation<BookingId, ()> {
    Mutation::new(
        client,
        |client: QueryClient, booking_id: BookingId| async move {
            client
                .api()
                .delete_booking(&booking_id)
                .await
                .map_err(QueryError::from)
        },
        |client, booking_id, _| {
            let flat = match cached_flat_id(client, *booking_id) {
                Some(flat_id) => QueryFilter::entity(FLAT, flat_id),
                None => QueryFilter::resource(FLAT),
            };
            vec![
                QueryFilter::resource(BOOKINGS),
                QueryFilter::resource(FLATS),
                flat,
            ]
        },
    )
}

fn cached_flat_id(
    client: &QueryClient,
    booking_id: BookingId,
) -> Option<FlatId> {
    client
        .cached_keys(&QueryFilter::resource(BOOKINGS))
        .iter()
        .find_map(|key| {
            let bookings: Vec<FlatBooking> =
                match client.get_query_data::<Vec<FlatBooking>>(key) {
                    Some(bookings) => bookings,
                    None => client
                        .get_query_data::<Lookup<FlatBooking>>(key)?
                        .found()
                        .into_iter()
                        .collect(),
                };
            bookings
                .into_iter()
                .find(|booking| booking.id == booking_id)
                .map(|booking| booking.flat.id)
        })
}
