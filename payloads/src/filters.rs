//! Typed filters for the list endpoints.
//!
//! Every filter has exactly one canonical serialization,
//! [`QueryParams::query_pairs`], which is used both for the request's query
//! string and for the cache key of the query layer. Unset fields are
//! omitted, list fields are sorted and de-duplicated and decimals are
//! normalized, so two filters that mean the same thing always serialize
//! identically.

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::Flat;

/// Canonical query-string serialization.
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

impl QueryParams for () {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl<A: QueryParams, B: QueryParams> QueryParams for (A, B) {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.0.query_pairs();
        pairs.extend(self.1.query_pairs());
        pairs
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Popularity,
    PriceAscending,
    PriceDescending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popularity => "popularity",
            Self::PriceAscending => "price_asc",
            Self::PriceDescending => "price_desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(Self::Newest),
            "popularity" => Some(Self::Popularity),
            "price_asc" => Some(Self::PriceAscending),
            "price_desc" => Some(Self::PriceDescending),
            _ => None,
        }
    }

    /// Label shown in the sort picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest ☆",
            Self::Popularity => "Popularity ♡",
            Self::PriceAscending => "Price ⭣",
            Self::PriceDescending => "Price ⭡",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarFilter {
    pub city: Option<String>,
    pub brands: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub available_from: Option<Timestamp>,
    pub available_to: Option<Timestamp>,
    pub sort: SortOrder,
}

impl CarFilter {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Default::default()
        }
    }

    /// Brands trimmed, sorted and de-duplicated.
    pub fn canonical_brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self
            .brands
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        brands.sort();
        brands.dedup();
        brands
    }
}

impl QueryParams for CarFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(city) = non_empty(&self.city) {
            pairs.push(("city", city));
        }
        let brands = self.canonical_brands();
        if !brands.is_empty() {
            pairs.push(("brand", brands.join(",")));
        }
        push_decimal(&mut pairs, "minPrice", self.min_price);
        push_decimal(&mut pairs, "maxPrice", self.max_price);
        if let Some(from) = self.available_from {
            pairs.push(("availableFrom", from.to_string()));
        }
        if let Some(to) = self.available_to {
            pairs.push(("availableTo", to.to_string()));
        }
        push_sort(&mut pairs, self.sort);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatFilter {
    /// Free-text search over name, location and description.
    pub query: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub available_from: Option<Date>,
    pub available_to: Option<Date>,
    /// Metres
    pub search_radius: Option<u32>,
    pub sort: SortOrder,
}

impl FlatFilter {
    /// Shortest search text that is treated as a search.
    pub const MIN_QUERY_LEN: usize = 3;

    /// Whether this filter narrows the list at all.
    ///
    /// Compares by value against the default filter, so a freshly built
    /// filter with default values is not a search.
    pub fn is_active(&self) -> bool {
        let without_query = Self {
            query: None,
            ..self.clone()
        };
        self.search_text().is_some() || without_query != Self::default()
    }

    /// The search text, when it is long enough to search by.
    pub fn search_text(&self) -> Option<String> {
        non_empty(&self.query)
            .filter(|q| q.chars().count() >= Self::MIN_QUERY_LEN)
    }

    /// Whether a stay period was asked for.
    pub fn has_period(&self) -> bool {
        self.available_from.is_some() || self.available_to.is_some()
    }

    /// A period that ends before it starts matches no flat.
    pub fn period_is_valid(&self) -> bool {
        match (self.available_from, self.available_to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    pub fn matches(&self, flat: &Flat) -> bool {
        if self.has_period()
            && !(self.period_is_valid() && flat.is_available())
        {
            return false;
        }
        if let Some(query) = self.search_text() {
            let query = query.to_lowercase();
            let hit = [&flat.name, &flat.location, &flat.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| flat.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| flat.price > max) {
            return false;
        }
        if self.search_radius.is_some_and(|r| flat.distance > r) {
            return false;
        }
        true
    }

    /// Apply the filter and its sort order to a full list of flats.
    pub fn apply(&self, flats: &[Flat]) -> Vec<Flat> {
        let mut flats: Vec<Flat> =
            flats.iter().filter(|f| self.matches(f)).cloned().collect();
        match self.sort {
            SortOrder::Newest => flats.sort_by_key(|f| Reverse(f.id)),
            // server order
            SortOrder::Popularity => {}
            SortOrder::PriceAscending => flats.sort_by_key(|f| f.price),
            SortOrder::PriceDescending => {
                flats.sort_by_key(|f| Reverse(f.price))
            }
        }
        flats
    }
}

impl QueryParams for FlatFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = self.search_text() {
            pairs.push(("query", query));
        }
        push_decimal(&mut pairs, "minPrice", self.min_price);
        push_decimal(&mut pairs, "maxPrice", self.max_price);
        if let Some(from) = self.available_from {
            pairs.push(("availableFrom", from.to_string()));
        }
        if let Some(to) = self.available_to {
            pairs.push(("availableTo", to.to_string()));
        }
        if let Some(radius) = self.search_radius {
            pairs.push(("searchRadius", radius.to_string()));
        }
        push_sort(&mut pairs, self.sort);
        pairs
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn push_decimal(
    pairs: &mut Vec<(&'static str, String)>,
    name: &'static str,
    value: Option<Decimal>,
) {
    if let Some(value) = value {
        pairs.push((name, value.normalize().to_string()));
    }
}

fn push_sort(pairs: &mut Vec<(&'static str, String)>, sort: SortOrder) {
    // newest is the server's default order
    if sort != SortOrder::Newest {
        pairs.push(("sort", sort.as_str().to_string()));
    }
}
