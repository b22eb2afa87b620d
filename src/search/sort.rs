use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use utoipa::ToSchema;

use crate::models::Hotel;

/// Sort key options for hotel listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    NameAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Featured => "featured",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::RatingDesc => "rating-desc",
            SortKey::NameAsc => "name-asc",
        }
    }

    /// Parses a wire name; anything unrecognized falls back to `Featured`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "price-asc" => SortKey::PriceAsc,
            "price-desc" => SortKey::PriceDesc,
            "rating-desc" => SortKey::RatingDesc,
            "name-asc" => SortKey::NameAsc,
            _ => SortKey::Featured,
        }
    }

    fn compare(&self, a: &Hotel, b: &Hotel) -> Ordering {
        match self {
            SortKey::PriceAsc => a.price.total_cmp(&b.price),
            SortKey::PriceDesc => b.price.total_cmp(&a.price),
            // Featured is the same ordering as rating-desc
            SortKey::RatingDesc | SortKey::Featured => rating_or_zero(b).total_cmp(&rating_or_zero(a)),
            SortKey::NameAsc => locale_compare(&a.name, &b.name),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns `hotels` ordered by `key`; ties keep their input order
pub fn sort_hotels(hotels: &[Hotel], key: SortKey) -> Vec<Hotel> {
    let mut sorted = hotels.to_vec();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

fn rating_or_zero(hotel: &Hotel) -> f64 {
    hotel.rating.unwrap_or(0.0)
}

/// Case-folded comparison with code-point order as the tie-break
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
