use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::bookings::{Booking, BookingStatus, ConfirmBookingRequest, NewBooking, UpdateBookingRequest};
use crate::client::{AiSearchRequest, AiSearchResponse, BookingApi, ClientError, HotelApi};
use crate::models::{Hotel, HotelPage, Location, NewHotel, NewLocation, Review};
use crate::reviews::NewReview;

/// HTTP implementation of the remote Hotel and Booking APIs
#[derive(Debug, Clone)]
pub struct RemoteApi {
    client: Client,
    base_url: Url,
}

impl RemoteApi {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8000/api/`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request and decodes a success body as `T`
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|e| {
            error!("Upstream request failed: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            if status.is_server_error() {
                error!("Upstream {} returned {}", url, status);
            } else {
                debug!("Upstream {} returned {}", url, status);
            }
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        debug!("Upstream {} returned {} ({} bytes)", url, status, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl HotelApi for RemoteApi {
    async fn list(&self, params: &[(String, String)]) -> Result<HotelPage, ClientError> {
        let mut url = self.endpoint(&["hotels"])?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        self.execute(self.client.get(url)).await
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<Hotel>, ClientError> {
        let mut url = self.endpoint(&["hotels", "search"])?;
        url.query_pairs_mut().append_pair("query", query);
        self.execute(self.client.get(url)).await
    }

    async fn ai_search(&self, request: &AiSearchRequest) -> Result<AiSearchResponse, ClientError> {
        let url = self.endpoint(&["hotels", "ai"])?;
        self.execute(self.client.post(url).json(request)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Hotel, ClientError> {
        let url = self.endpoint(&["hotels", id])?;
        self.execute(self.client.get(url)).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, ClientError> {
        let url = self.endpoint(&["locations"])?;
        self.execute(self.client.get(url)).await
    }

    async fn create_hotel(&self, token: &str, hotel: &NewHotel) -> Result<Hotel, ClientError> {
        let url = self.endpoint(&["hotels"])?;
        self.execute(self.client.post(url).bearer_auth(token).json(hotel)).await
    }

    async fn add_location(&self, token: &str, location: &NewLocation) -> Result<Location, ClientError> {
        let url = self.endpoint(&["locations"])?;
        self.execute(self.client.post(url).bearer_auth(token).json(location)).await
    }

    async fn reviews_for_hotel(&self, hotel_id: &str) -> Result<Vec<Review>, ClientError> {
        let url = self.endpoint(&["reviews", "hotel", hotel_id])?;
        self.execute(self.client.get(url)).await
    }

    async fn add_review(&self, token: &str, review: &NewReview) -> Result<Review, ClientError> {
        let url = self.endpoint(&["reviews"])?;
        self.execute(self.client.post(url).bearer_auth(token).json(review)).await
    }
}

#[async_trait]
impl BookingApi for RemoteApi {
    async fn list_mine(&self, token: &str) -> Result<Vec<Booking>, ClientError> {
        let url = self.endpoint(&["bookings", "me"])?;
        self.execute(self.client.get(url).bearer_auth(token)).await
    }

    async fn list_all(&self, token: &str) -> Result<Vec<Booking>, ClientError> {
        let url = self.endpoint(&["bookings"])?;
        self.execute(self.client.get(url).bearer_auth(token)).await
    }

    async fn create(&self, token: &str, booking: &NewBooking) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings"])?;
        self.execute(self.client.post(url).bearer_auth(token).json(booking)).await
    }

    async fn cancel(&self, token: &str, id: &str) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", id, "cancel"])?;
        self.execute(self.client.patch(url).bearer_auth(token)).await
    }

    async fn update(&self, token: &str, id: &str, update: &UpdateBookingRequest) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", id])?;
        self.execute(self.client.patch(url).bearer_auth(token).json(update)).await
    }

    async fn confirm(&self, token: &str, id: &str, request: &ConfirmBookingRequest) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", id, "confirm"])?;
        self.execute(self.client.patch(url).bearer_auth(token).json(request)).await
    }

    async fn update_status(&self, token: &str, id: &str, status: BookingStatus) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", id, "status"])?;
        let body = json!({ "status": status });
        self.execute(self.client.patch(url).bearer_auth(token).json(&body)).await
    }

    async fn get_by_id(&self, token: &str, id: &str) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", id])?;
        self.execute(self.client.get(url).bearer_auth(token)).await
    }

    async fn get_by_session_id(&self, token: &str, session_id: &str) -> Result<Booking, ClientError> {
        let url = self.endpoint(&["bookings", "session", session_id])?;
        self.execute(self.client.get(url).bearer_auth(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn api(server: &MockServer) -> RemoteApi {
        RemoteApi::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
    }

    fn booking_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "hotelId": "h1",
            "checkIn": "2026-07-01T14:00:00Z",
            "checkOut": "2026-07-03T11:00:00Z",
            "status": status
        })
    }

    #[tokio::test]
    async fn test_list_forwards_repeated_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/hotels"))
            .and(query_param("locations", "France"))
            .and(query_param("limit", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hotels": [{ "_id": "h1", "name": "Harbor House", "price": 120 }],
                "total": 13,
                "totalPages": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = vec![
            ("locations".to_string(), "France".to_string()),
            ("locations".to_string(), "Italy".to_string()),
            ("limit".to_string(), "12".to_string()),
        ];
        let page = api(&server).await.list(&params).await.unwrap();

        assert_eq!(page.hotels.len(), 1);
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_search_by_text_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/hotels/search"))
            .and(query_param("query", "sea view & spa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "_id": "h2", "name": "Cliff" }])))
            .mount(&server)
            .await;

        let hotels = api(&server).await.search_by_text("sea view & spa").await.unwrap();
        assert_eq!(hotels[0].id, "h2");
    }

    #[tokio::test]
    async fn test_ai_search_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/hotels/ai"))
            .and(body_json(json!({
                "query": "beach",
                "preferences": { "vibe": "relaxing" },
                "filters": {},
                "page": 1,
                "pageSize": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Beach hotels" })))
            .mount(&server)
            .await;

        let response = api(&server).await.ai_search(&AiSearchRequest::new("beach", 1)).await.unwrap();
        assert_eq!(response.response, "Beach hotels");
        assert!(response.matched_hotels.is_empty());
    }

    #[tokio::test]
    async fn test_error_message_is_taken_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/hotels/ai"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "AI is busy" })))
            .mount(&server)
            .await;

        let err = api(&server).await.ai_search(&AiSearchRequest::new("beach", 1)).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.user_message("Could not get AI response. Try again."), "AI is busy");
    }

    #[tokio::test]
    async fn test_booking_calls_send_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/bookings/b1/cancel"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(booking_json("b1", "CANCELLED")))
            .expect(1)
            .mount(&server)
            .await;

        let booking = api(&server).await.cancel("token-123", "b1").await.unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_update_status_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/bookings/b1/status"))
            .and(body_json(json!({ "status": "COMPLETED" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(booking_json("b1", "COMPLETED")))
            .mount(&server)
            .await;

        let booking = api(&server)
            .await
            .update_status("t", "b1", BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_session_lookup_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bookings/session/cs_test_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(booking_json("b5", "PENDING")))
            .mount(&server)
            .await;

        let booking = api(&server).await.get_by_session_id("t", "cs_test_1").await.unwrap();
        assert_eq!(booking.id, "b5");
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/hotels/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Hotel not found" })))
            .mount(&server)
            .await;

        let err = HotelApi::get_by_id(&api(&server).await, "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_add_review_posts_body_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reviews"))
            .and(header("authorization", "Bearer token-9"))
            .and(body_json(json!({
                "hotelId": "h1",
                "rating": 4,
                "comment": "Quiet rooms",
                "userName": "Ada"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "_id": "r1",
                "hotelId": "h1",
                "userName": "Ada",
                "rating": 4,
                "comment": "Quiet rooms"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = NewReview {
            hotel_id: "h1".into(),
            rating: 4,
            comment: "Quiet rooms".into(),
            user_name: Some("Ada".into()),
        };
        let review = api(&server).await.add_review("token-9", &request).await.unwrap();
        assert_eq!(review.id.as_deref(), Some("r1"));
        assert_eq!(review.rating, 4.0);
    }

    #[tokio::test]
    async fn test_reviews_for_hotel_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reviews/hotel/h1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "_id": "r1", "userName": "Ada", "rating": 5, "comment": "Great" }
            ])))
            .mount(&server)
            .await;

        let reviews = api(&server).await.reviews_for_hotel("h1").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].author, "Ada");
    }

    #[tokio::test]
    async fn test_add_location_posts_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/locations"))
            .and(body_json(json!({ "name": "Italy" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "loc-9", "name": "Italy" })))
            .expect(1)
            .mount(&server)
            .await;

        let location = api(&server)
            .await
            .add_location("t", &NewLocation { name: "Italy".into() })
            .await
            .unwrap();
        assert_eq!(location.id, "loc-9");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(RemoteApi::new("not a url", Duration::from_secs(1)).is_err());
    }
}
