// Browse view filter state
//
// The browse view keeps its filters in the URL query string. This module
// parses and renders that query string, applies the view's filter
// actions, derives the active filter chips and builds the parameters
// forwarded to the remote hotel list.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::search::sort::SortKey;

/// Hotels per browse page
pub const BROWSE_PAGE_SIZE: u32 = 12;

/// Filters of the browse view
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub locations: Vec<String>,
    pub amenities: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub star_rating: Option<u32>,
    pub sort_by: SortKey,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            amenities: Vec::new(),
            min_price: None,
            max_price: None,
            min_rating: None,
            star_rating: None,
            sort_by: SortKey::Featured,
            page: 1,
        }
    }
}

/// One change to the browse filters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FilterChange {
    Locations(Vec<String>),
    Amenities(Vec<String>),
    ToggleLocation(String),
    ToggleAmenity(String),
    PriceRange { min: Option<f64>, max: Option<f64> },
    MinRating(Option<f64>),
    StarRating(Option<u32>),
    /// Selecting the current rating again clears it
    ToggleMinRating(f64),
    ToggleStarRating(u32),
}

/// Kind of an active filter chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChipKind {
    Location,
    MinPrice,
    MaxPrice,
    MinRating,
    StarRating,
    Amenity,
}

/// Removable label for one active filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterChip {
    pub kind: ChipKind,
    pub value: String,
    pub label: String,
}

impl FilterState {
    /// Parses a URL query string; bad numbers count as no constraint
    pub fn from_query(query: &str) -> Self {
        let mut state = FilterState::default();

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "locations" => state.locations.push(value.into_owned()),
                "amenities" => state.amenities.push(value.into_owned()),
                "minPrice" => state.min_price = parse_number(&value),
                "maxPrice" => state.max_price = parse_number(&value),
                "minRating" => state.min_rating = parse_number(&value),
                "starRating" => state.star_rating = value.trim().parse().ok(),
                "sortBy" => state.sort_by = SortKey::parse(&value),
                "page" => state.page = value.trim().parse::<u32>().unwrap_or(1).max(1),
                _ => {}
            }
        }
        state
    }

    /// Renders the URL query string; page 1 and empty filters are omitted
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            if key == "page" && self.page <= 1 {
                continue;
            }
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Parameters for the remote hotel list: every filter, the page and the page size
    pub fn upstream_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .pairs()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        params.push(("limit".to_string(), BROWSE_PAGE_SIZE.to_string()));
        params
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        pairs.extend(self.locations.iter().map(|l| ("locations", l.clone())));
        pairs.extend(self.amenities.iter().map(|a| ("amenities", a.clone())));
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        if let Some(rating) = self.min_rating {
            pairs.push(("minRating", rating.to_string()));
        }
        if let Some(stars) = self.star_rating {
            pairs.push(("starRating", stars.to_string()));
        }
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs
    }

    /// Applies a filter change and goes back to the first page
    pub fn apply_change(mut self, change: FilterChange) -> Self {
        match change {
            FilterChange::Locations(locations) => self.locations = locations,
            FilterChange::Amenities(amenities) => self.amenities = amenities,
            FilterChange::ToggleLocation(location) => toggle(&mut self.locations, location),
            FilterChange::ToggleAmenity(amenity) => toggle(&mut self.amenities, amenity),
            FilterChange::PriceRange { min, max } => {
                self.min_price = min;
                self.max_price = max;
            }
            FilterChange::MinRating(rating) => self.min_rating = rating,
            FilterChange::StarRating(stars) => self.star_rating = stars,
            FilterChange::ToggleMinRating(rating) => {
                self.min_rating = if self.min_rating == Some(rating) { None } else { Some(rating) };
            }
            FilterChange::ToggleStarRating(stars) => {
                self.star_rating = if self.star_rating == Some(stars) { None } else { Some(stars) };
            }
        }
        self.page = 1;
        self
    }

    /// Changes the sort key and goes back to the first page
    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self.page = 1;
        self
    }

    /// Moves to `page`, keeping every filter
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Drops every filter, the sort key and the page
    pub fn clear(self) -> Self {
        FilterState::default()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.chips().is_empty()
    }

    /// Active filter chips: locations, price bounds, ratings, then amenities
    pub fn chips(&self) -> Vec<FilterChip> {
        let mut chips: Vec<FilterChip> = self
            .locations
            .iter()
            .map(|l| FilterChip::new(ChipKind::Location, l.clone(), l.clone()))
            .collect();

        if let Some(min) = self.min_price {
            chips.push(FilterChip::new(ChipKind::MinPrice, min.to_string(), format!("Min: ${}", min)));
        }
        if let Some(max) = self.max_price {
            chips.push(FilterChip::new(ChipKind::MaxPrice, max.to_string(), format!("Max: ${}", max)));
        }
        if let Some(rating) = self.min_rating {
            chips.push(FilterChip::new(ChipKind::MinRating, rating.to_string(), format!("{}+ Rating", rating)));
        }
        if let Some(stars) = self.star_rating {
            chips.push(FilterChip::new(ChipKind::StarRating, stars.to_string(), format!("{} Stars", stars)));
        }
        chips.extend(
            self.amenities
                .iter()
                .map(|a| FilterChip::new(ChipKind::Amenity, a.clone(), a.clone())),
        );
        chips
    }

    /// Removes the value behind a chip and goes back to the first page
    pub fn remove_chip(mut self, kind: ChipKind, value: &str) -> Self {
        match kind {
            ChipKind::Location => self.locations.retain(|l| l != value),
            ChipKind::Amenity => self.amenities.retain(|a| a != value),
            ChipKind::MinPrice => self.min_price = None,
            ChipKind::MaxPrice => self.max_price = None,
            ChipKind::MinRating => self.min_rating = None,
            ChipKind::StarRating => self.star_rating = None,
        }
        self.page = 1;
        self
    }
}

impl FilterChip {
    fn new(kind: ChipKind, value: String, label: String) -> Self {
        Self { kind, value, label }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query())
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn toggle(values: &mut Vec<String>, value: String) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}
