use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Review;
use crate::validation::validate_not_blank;

/// Request body for reviewing a hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(custom = "validate_not_blank")]
    pub hotel_id: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5)]
    pub rating: u8,
    #[validate(custom = "validate_not_blank", length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: String,
    /// Display name; the caller's user id is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub user_name: Option<String>,
}

/// Reviews of one hotel with their count and mean rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelReviews {
    pub hotel_id: String,
    pub count: usize,
    /// `None` when the hotel has no reviews yet
    pub average_rating: Option<f64>,
    pub reviews: Vec<Review>,
}

impl HotelReviews {
    pub fn new(hotel_id: String, reviews: Vec<Review>) -> Self {
        Self {
            hotel_id,
            count: reviews.len(),
            average_rating: average_rating(&reviews),
            reviews,
        }
    }
}

/// Arithmetic mean of the ratings, rounded to one decimal
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: f64 = reviews.iter().map(|r| r.rating).sum();
    let mean = sum / reviews.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
