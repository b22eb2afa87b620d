// Router, OpenAPI document and middleware layers

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::bookings::{self, handlers as booking_handlers};
use crate::browse::{self, handlers as browse_handlers};
use crate::error::ErrorResponse;
use crate::models::{Hotel, HotelPage, Location, NewHotel, NewLocation, Review};
use crate::reviews::{self, handlers as review_handlers};
use crate::search::{self, handlers as search_handlers};
use crate::state::AppState;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        search_handlers::get_listings,
        search_handlers::get_search,
        search_handlers::start_search,
        search_handlers::load_more,
        search_handlers::clear_search,
        search_handlers::get_search_results,
        search_handlers::extract_criteria,
        browse_handlers::browse_hotels,
        browse_handlers::apply_filter_action,
        browse_handlers::get_hotel,
        browse_handlers::list_locations,
        browse_handlers::create_hotel,
        browse_handlers::create_location,
        review_handlers::list_hotel_reviews,
        review_handlers::add_review,
        booking_handlers::list_my_bookings,
        booking_handlers::get_booking_stats,
        booking_handlers::get_booking,
        booking_handlers::get_booking_by_session,
        booking_handlers::create_booking,
        booking_handlers::update_booking,
        booking_handlers::cancel_booking,
        booking_handlers::list_all_bookings,
        booking_handlers::confirm_booking,
        booking_handlers::update_booking_status,
    ),
    components(
        schemas(
            Hotel, Review, Location, HotelPage, NewHotel, NewLocation, ErrorResponse,
            reviews::NewReview, reviews::HotelReviews,
            search::SearchCriteria, search::PriceRange, search::SortKey, search::SearchState,
            search_handlers::SearchRequest, search_handlers::CriteriaRequest,
            search_handlers::ListingsResponse, search_handlers::SearchResultsResponse,
            browse::FilterState, browse::FilterChip, browse::ChipKind,
            browse_handlers::BrowseResponse, browse_handlers::FilterStateResponse,
            bookings::Booking, bookings::BookingView, bookings::HotelRef, bookings::HotelSummary,
            bookings::BookingStatus, bookings::PaymentStatus, bookings::NewBooking,
            bookings::UpdateBookingRequest, bookings::ConfirmBookingRequest, bookings::UpdateStatusRequest,
            bookings::BookingStats,
        )
    ),
    tags(
        (name = "search", description = "AI search sessions and the home listing"),
        (name = "hotels", description = "Browse view, hotel detail and locations"),
        (name = "reviews", description = "Hotel reviews"),
        (name = "bookings", description = "Guest bookings"),
        (name = "admin", description = "Catalog and booking management for administrators")
    ),
    info(
        title = "Hotel Listings API",
        version = "1.0.0",
        description = "Gateway in front of the hotel search and booking services"
    )
)]
pub struct ApiDoc;

/// Routes without middleware layers
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Search and listings
        .route("/api/listings", get(search_handlers::get_listings))
        .route(
            "/api/search",
            get(search_handlers::get_search)
                .post(search_handlers::start_search)
                .delete(search_handlers::clear_search),
        )
        .route("/api/search/more", post(search_handlers::load_more))
        .route("/api/search/results", get(search_handlers::get_search_results))
        .route("/api/search/criteria", post(search_handlers::extract_criteria))
        // Browse
        .route("/api/hotels", get(browse_handlers::browse_hotels))
        .route("/api/hotels/filters", post(browse_handlers::apply_filter_action))
        .route("/api/hotels/:id", get(browse_handlers::get_hotel))
        .route("/api/locations", get(browse_handlers::list_locations))
        // Reviews
        .route("/api/hotels/:id/reviews", get(review_handlers::list_hotel_reviews))
        .route("/api/reviews", post(review_handlers::add_review))
        // Bookings
        .route("/api/bookings", post(booking_handlers::create_booking))
        .route("/api/bookings/me", get(booking_handlers::list_my_bookings))
        .route("/api/bookings/me/stats", get(booking_handlers::get_booking_stats))
        .route(
            "/api/bookings/session/:session_id",
            get(booking_handlers::get_booking_by_session),
        )
        .route(
            "/api/bookings/:id",
            get(booking_handlers::get_booking).patch(booking_handlers::update_booking),
        )
        .route("/api/bookings/:id/cancel", patch(booking_handlers::cancel_booking))
        // Admin
        .route("/api/admin/hotels", post(browse_handlers::create_hotel))
        .route("/api/admin/locations", post(browse_handlers::create_location))
        .route("/api/admin/bookings", get(booking_handlers::list_all_bookings))
        .route("/api/admin/bookings/:id/confirm", patch(booking_handlers::confirm_booking))
        .route("/api/admin/bookings/:id/status", patch(booking_handlers::update_booking_status))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
