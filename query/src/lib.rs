//! Query and cache layer over the rental [`APIClient`](payloads::APIClient).
//!
//! Reads go through a [`QueryClient`], which caches responses per
//! [`QueryKey`], shares one request between concurrent callers of the same
//! key, and serves paginated lists incrementally through [`InfiniteQuery`].
//! Writes are [`Mutation`]s that invalidate the cache entries whose server
//! state they changed. The [`hooks`] module wires these up per resource.

mod cache;
mod client;
pub mod config;
mod error;
pub mod hooks;
mod infinite;
mod key;
mod mutation;
mod state;

pub use cache::{CacheEvent, CacheEventKind};
pub use client::{QueryClient, QueryTask};
pub use config::{Config, ConfigError, PageSizes};
pub use error::{GENERIC_ERROR_MESSAGE, QueryError};
pub use infinite::{FetchNext, InfiniteData, InfiniteQuery};
pub use key::{QueryFilter, QueryKey};
pub use mutation::Mutation;
pub use state::{AuthState, FetchState, MutationState, QueryState, QueryStatus};

/// Resource names used in cache keys.
///
/// Single pages and infinite sequences of a list share the list's name, so
/// invalidating the list reaches both. Their keys never collide because only
/// single pages carry a `page` parameter.
pub mod resources {
    pub const CARS: &str = "cars";
    pub const CAR: &str = "car";
    pub const LOCATIONS: &str = "locations";
    pub const CITIES: &str = "cities";
    pub const RENTALS: &str = "rentals";
    pub const RENTAL: &str = "rental";
    pub const FLATS: &str = "flats";
    pub const FLAT: &str = "flat";
    pub const BOOKINGS: &str = "bookings";
}
