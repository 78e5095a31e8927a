use payloads::requests::{CustomerEmail, validate_email};
use payloads::responses::AuthData;

use super::invalid_input;
use crate::resources::{BOOKINGS, RENTAL, RENTALS};
use crate::{AuthState, Mutation, QueryClient, QueryError, QueryFilter};

/// Register a new customer. On success the client is logged in as them.
pub fn use_register(
    client: &QueryClient,
) -> Mutation<CustomerEmail, AuthData> {
    Mutation::new(
        client,
        |client: QueryClient, details: CustomerEmail| async move {
            check_email(&details)?;
            let auth = client.api().register(&details).await?;
            switch_user(&client, AuthState::LoggedIn {
                email: auth.email.clone(),
            });
            Ok::<_, QueryError>(auth)
        },
        |_, _, _| Vec::new(),
    )
}

pub fn use_login(client: &QueryClient) -> Mutation<CustomerEmail, AuthData> {
    Mutation::new(
        client,
        |client: QueryClient, details: CustomerEmail| async move {
            check_email(&details)?;
            let auth = client.api().login(&details).await?;
            switch_user(&client, AuthState::LoggedIn {
                email: auth.email.clone(),
            });
            Ok::<_, QueryError>(auth)
        },
        |_, _, _| Vec::new(),
    )
}

/// Forget the token and everything cached for the customer.
pub fn use_logout(client: &QueryClient) -> Mutation<(), ()> {
    Mutation::new(
        client,
        |client: QueryClient, ()| async move {
            client.api().logout();
            switch_user(&client, AuthState::LoggedOut);
            Ok::<_, QueryError>(())
        },
        |_, _, _| Vec::new(),
    )
}

fn check_email(details: &CustomerEmail) -> Result<(), QueryError> {
    match validate_email(&details.email).error_message() {
        Some(message) => Err(invalid_input(message)),
        None => Ok(()),
    }
}

/// Data cached for one customer must not be shown to the next.
fn switch_user(client: &QueryClient, state: AuthState) {
    for resource in [RENTALS, RENTAL, BOOKINGS] {
        client.remove_queries(&QueryFilter::resource(resource));
    }
    tracing::info!(authenticated = state.is_authenticated(), "auth changed");
    client.set_auth_state(state);
}
