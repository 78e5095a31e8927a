use std::env::VarError;

/// Page sizes used by the infinite list hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub cars: u32,
    pub rentals: u32,
    pub flats: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            cars: 10,
            rentals: 5,
            flats: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the rental backend, without a trailing path.
    pub api_url: String,
    pub page_sizes: PageSizes,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Config {
    /// Read the configuration from the environment, loading a `.env` file
    /// first if there is one.
    ///
    /// - RENTAL_API_URL: base URL of the backend (required)
    /// - CARS_PAGE_SIZE: defaults to 10
    /// - RENTALS_PAGE_SIZE: defaults to 5
    /// - FLATS_PAGE_SIZE: defaults to 10
    pub fn from_env() -> Result<Self, ConfigError> {
        // silently ignored if the file doesn't exist
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name))
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, VarError>,
    ) -> Result<Self, ConfigError> {
        let api_url = lookup("RENTAL_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("RENTAL_API_URL"))?;
        let defaults = PageSizes::default();
        let page_size = |name, default| match lookup(name) {
            Err(_) => Ok(default),
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidNumber { name, value }),
        };
        Ok(Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            page_sizes: PageSizes {
                cars: page_size("CARS_PAGE_SIZE", defaults.cars)?,
                rentals: page_size("RENTALS_PAGE_SIZE", defaults.rentals)?,
                flats: page_size("FLATS_PAGE_SIZE", defaults.flats)?,
            },
        })
    }
}
