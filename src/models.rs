use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// A hotel listing as returned by the upstream hotel API
///
/// Missing numeric and text fields fall back to neutral values so that the
/// listing pipeline never sees a half-populated record. The rating is the
/// exception: an absent rating stays `None` and is never coerced to zero
/// at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(rename = "_id", alias = "id")]
    #[schema(example = "65f1c0a2e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "Montmartre Majesty Hotel")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Paris, France")]
    pub location: String,
    #[serde(default)]
    #[schema(example = 160.0)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 4.7, minimum = 0.0, maximum = 5.0)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// A guest review attached to exactly one hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
    #[serde(default, alias = "userName")]
    pub author: String,
    #[serde(default)]
    #[schema(example = 5.0)]
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A selectable location tab entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

/// Request body for adding a hotel to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewHotel {
    #[validate(custom = "validate_not_blank", length(max = 200))]
    #[schema(example = "Montmartre Majesty Hotel")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Paris, France")]
    pub location: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[schema(example = 160.0)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image: Option<String>,
}

/// Request body for adding a location tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewLocation {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    #[schema(example = "Italy")]
    pub name: String,
}

/// One page of hotels from the upstream list endpoint
///
/// The upstream API answers either with a bare array (legacy) or with an
/// object carrying pagination totals; both shapes deserialize here.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelPage {
    pub hotels: Vec<Hotel>,
    pub total: u64,
    pub total_pages: u32,
}

impl<'de> Deserialize<'de> for HotelPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Paged {
            #[serde(default)]
            hotels: Vec<Hotel>,
            #[serde(default)]
            total: Option<u64>,
            #[serde(default)]
            total_pages: Option<u32>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Bare(Vec<Hotel>),
            Paged(Paged),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Bare(hotels) => HotelPage {
                total: hotels.len() as u64,
                total_pages: 1,
                hotels,
            },
            Shape::Paged(paged) => HotelPage {
                total: paged.total.unwrap_or(paged.hotels.len() as u64),
                total_pages: paged.total_pages.unwrap_or(1).max(1),
                hotels: paged.hotels,
            },
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Hotel;

    /// Builds a hotel with the fields the pipeline cares about
    pub fn hotel(name: &str, location: &str, price: f64, rating: Option<f64>, amenities: &[&str]) -> Hotel {
        Hotel {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            location: location.to_string(),
            price,
            rating,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            description: None,
            image: None,
            reviews: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotel_deserialization_with_defaults() {
        let json = r#"{ "_id": "h1", "name": "Seaside Inn" }"#;
        let hotel: Hotel = serde_json::from_str(json).expect("Failed to deserialize Hotel");

        assert_eq!(hotel.id, "h1");
        assert_eq!(hotel.name, "Seaside Inn");
        assert_eq!(hotel.location, "");
        assert_eq!(hotel.price, 0.0);
        assert_eq!(hotel.rating, None);
        assert!(hotel.amenities.is_empty());
        assert!(hotel.reviews.is_empty());
    }

    #[test]
    fn test_hotel_accepts_plain_id_alias() {
        let json = r#"{ "id": "h2", "price": 99.5, "rating": 4.2 }"#;
        let hotel: Hotel = serde_json::from_str(json).expect("Failed to deserialize Hotel");

        assert_eq!(hotel.id, "h2");
        assert_eq!(hotel.price, 99.5);
        assert_eq!(hotel.rating, Some(4.2));
    }

    #[test]
    fn test_hotel_serialization_uses_upstream_id_key() {
        let hotel = fixtures::hotel("A", "Paris, France", 120.0, None, &["Pool"]);
        let json = serde_json::to_string(&hotel).expect("Failed to serialize Hotel");

        assert!(json.contains("\"_id\":\"a\""));
        assert!(json.contains("\"amenities\":[\"Pool\"]"));
        assert!(!json.contains("\"rating\""));
    }

    #[test]
    fn test_hotel_page_from_bare_array() {
        let json = r#"[{ "_id": "h1" }, { "_id": "h2" }]"#;
        let page: HotelPage = serde_json::from_str(json).expect("Failed to deserialize HotelPage");

        assert_eq!(page.hotels.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_hotel_page_from_paged_object() {
        let json = r#"{ "hotels": [{ "_id": "h1" }], "total": 25, "totalPages": 3 }"#;
        let page: HotelPage = serde_json::from_str(json).expect("Failed to deserialize HotelPage");

        assert_eq!(page.hotels.len(), 1);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_review_keeps_upstream_ids() {
        let json = r#"{ "_id": "r1", "hotelId": "h1", "userName": "Ada", "rating": 4, "comment": "Quiet" }"#;
        let review: Review = serde_json::from_str(json).expect("Failed to deserialize Review");

        assert_eq!(review.id.as_deref(), Some("r1"));
        assert_eq!(review.hotel_id.as_deref(), Some("h1"));
        assert_eq!(review.author, "Ada");
    }

    #[test]
    fn test_new_hotel_validation() {
        let mut hotel = NewHotel {
            name: "Harbor House".into(),
            location: "Lisbon, Portugal".into(),
            price: 120.0,
            rating: Some(4.5),
            amenities: vec!["Wifi".into()],
            description: None,
            image: Some("https://img.example.com/harbor.jpg".into()),
        };
        assert!(hotel.validate().is_ok());

        hotel.price = -1.0;
        assert!(hotel.validate().is_err());

        hotel.price = 0.0;
        hotel.rating = Some(5.5);
        assert!(hotel.validate().is_err());

        hotel.rating = None;
        hotel.name = "  ".into();
        assert!(hotel.validate().is_err());

        hotel.name = "Harbor House".into();
        hotel.image = Some("not a url".into());
        assert!(hotel.validate().is_err());
    }

    #[test]
    fn test_new_location_validation() {
        assert!(NewLocation { name: "Italy".into() }.validate().is_ok());
        assert!(NewLocation { name: "".into() }.validate().is_err());
    }
}
