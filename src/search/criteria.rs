use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive price bounds; `None` means the bound is not constrained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Structured constraints derived from a free-text assistant response
///
/// Every field defaults to "no constraint". An absent bound or rating is
/// distinct from a bound or rating of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SearchCriteria {
    /// Whether at least one field constrains the result set
    pub fn has_constraints(&self) -> bool {
        !self.price_range.is_unbounded()
            || self.location.is_some()
            || !self.amenities.is_empty()
            || self.rating.is_some()
            || !self.keywords.is_empty()
    }
}
