// Remote Hotel/Search and Booking API clients
//
// Handlers depend on the `HotelApi` and `BookingApi` traits so that tests
// can swap the HTTP implementation for in-memory fakes.

pub mod cache;
pub mod error;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::bookings::{Booking, BookingStatus, ConfirmBookingRequest, NewBooking, UpdateBookingRequest};
use crate::models::{Hotel, HotelPage, Location, NewHotel, NewLocation, Review};
use crate::reviews::NewReview;

pub use cache::{booking_mutation_tags, review_mutation_tags, CacheTag, QueryCache};
pub use error::ClientError;
pub use http::RemoteApi;

/// Results per AI search page
pub const AI_SEARCH_PAGE_SIZE: u32 = 10;

/// Body of `POST hotels/ai`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiSearchRequest {
    pub query: String,
    #[schema(value_type = Object)]
    pub preferences: Value,
    #[schema(value_type = Object)]
    pub filters: Value,
    pub page: u32,
    pub page_size: u32,
}

impl AiSearchRequest {
    /// Request for one page of results with the default "relaxing" vibe
    pub fn new(query: &str, page: u32) -> Self {
        Self {
            query: query.trim().to_string(),
            preferences: json!({ "vibe": "relaxing" }),
            filters: json!({}),
            page: page.max(1),
            page_size: AI_SEARCH_PAGE_SIZE,
        }
    }
}

/// Response of `POST hotels/ai`; every field is optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSearchResponse {
    pub response: String,
    #[schema(value_type = Vec<Object>)]
    pub recommendations: Vec<Value>,
    pub matched_hotels: Vec<Hotel>,
    pub results: Vec<Hotel>,
    pub total_count: u64,
}

/// Remote Hotel/Search API
#[async_trait]
pub trait HotelApi: Send + Sync {
    /// `GET hotels` with browse filters as repeated query parameters
    async fn list(&self, params: &[(String, String)]) -> Result<HotelPage, ClientError>;

    /// `GET hotels/search?query=`
    async fn search_by_text(&self, query: &str) -> Result<Vec<Hotel>, ClientError>;

    /// `POST hotels/ai`
    async fn ai_search(&self, request: &AiSearchRequest) -> Result<AiSearchResponse, ClientError>;

    /// `GET hotels/:id`
    async fn get_by_id(&self, id: &str) -> Result<Hotel, ClientError>;

    /// `GET locations`
    async fn list_locations(&self) -> Result<Vec<Location>, ClientError>;

    /// `POST hotels` (admin token)
    async fn create_hotel(&self, token: &str, hotel: &NewHotel) -> Result<Hotel, ClientError>;

    /// `POST locations` (admin token)
    async fn add_location(&self, token: &str, location: &NewLocation) -> Result<Location, ClientError>;

    /// `GET reviews/hotel/:id`
    async fn reviews_for_hotel(&self, hotel_id: &str) -> Result<Vec<Review>, ClientError>;

    /// `POST reviews`
    async fn add_review(&self, token: &str, review: &NewReview) -> Result<Review, ClientError>;
}

/// Remote Booking API; every call forwards the caller's bearer token
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_mine(&self, token: &str) -> Result<Vec<Booking>, ClientError>;

    async fn list_all(&self, token: &str) -> Result<Vec<Booking>, ClientError>;

    async fn create(&self, token: &str, booking: &NewBooking) -> Result<Booking, ClientError>;

    async fn cancel(&self, token: &str, id: &str) -> Result<Booking, ClientError>;

    async fn update(&self, token: &str, id: &str, update: &UpdateBookingRequest) -> Result<Booking, ClientError>;

    async fn confirm(&self, token: &str, id: &str, request: &ConfirmBookingRequest) -> Result<Booking, ClientError>;

    async fn update_status(&self, token: &str, id: &str, status: BookingStatus) -> Result<Booking, ClientError>;

    async fn get_by_id(&self, token: &str, id: &str) -> Result<Booking, ClientError>;

    /// Booking created by a payment checkout session
    async fn get_by_session_id(&self, token: &str, session_id: &str) -> Result<Booking, ClientError>;
}
