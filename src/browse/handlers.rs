// HTTP handlers for the browse view, hotel detail and locations

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AdminUser;
use crate::browse::filter_state::{ChipKind, FilterChange, FilterChip, FilterState, BROWSE_PAGE_SIZE};
use crate::client::CacheTag;
use crate::error::ApiError;
use crate::models::{Hotel, HotelPage, Location, NewHotel, NewLocation};
use crate::search::sort::SortKey;
use crate::state::AppState;

/// One browse page with the filters that produced it
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub filters: FilterState,
    /// Canonical query string of `filters`
    pub query: String,
    pub chips: Vec<FilterChip>,
    pub hotels: Vec<Hotel>,
    pub total: u64,
    pub total_pages: u32,
    pub page: u32,
    pub page_size: u32,
}

/// A browse filter action applied to the current query string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FilterAction {
    Change {
        change: FilterChange,
    },
    Sort {
        #[serde(rename = "sortBy")]
        sort_by: String,
    },
    Page {
        page: u32,
    },
    RemoveChip {
        kind: ChipKind,
        value: String,
    },
    Clear,
}

impl FilterAction {
    fn apply(self, state: FilterState) -> FilterState {
        match self {
            FilterAction::Change { change } => state.apply_change(change),
            FilterAction::Sort { sort_by } => state.with_sort(SortKey::parse(&sort_by)),
            FilterAction::Page { page } => state.with_page(page),
            FilterAction::RemoveChip { kind, value } => state.remove_chip(kind, &value),
            FilterAction::Clear => state.clear(),
        }
    }
}

/// Filters after an action, with the query string to navigate to
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterStateResponse {
    pub filters: FilterState,
    pub query: String,
    pub chips: Vec<FilterChip>,
    pub has_active_filters: bool,
}

impl From<FilterState> for FilterStateResponse {
    fn from(filters: FilterState) -> Self {
        Self {
            query: filters.to_query(),
            chips: filters.chips(),
            has_active_filters: filters.has_active_filters(),
            filters,
        }
    }
}

/// Handler for GET /api/hotels
/// Browse view: forwards the URL filters to the hotel list
#[utoipa::path(
    get,
    path = "/api/hotels",
    params(
        ("locations" = Option<Vec<String>>, Query, description = "Repeated location filter"),
        ("amenities" = Option<Vec<String>>, Query, description = "Repeated amenity filter"),
        ("minPrice" = Option<f64>, Query, description = "Minimum nightly price"),
        ("maxPrice" = Option<f64>, Query, description = "Maximum nightly price"),
        ("minRating" = Option<f64>, Query, description = "Minimum guest rating"),
        ("starRating" = Option<u32>, Query, description = "Star rating"),
        ("sortBy" = Option<String>, Query, description = "featured, price-asc, price-desc, rating-desc or name-asc"),
        ("page" = Option<u32>, Query, description = "1-based page")
    ),
    responses(
        (status = 200, description = "One page of hotels", body = BrowseResponse),
        (status = 502, description = "Hotel list unavailable", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn browse_hotels(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<BrowseResponse>, ApiError> {
    let filters = FilterState::from_query(raw.as_deref().unwrap_or_default());
    debug!("Browsing hotels with filters: {}", filters);

    let params = filters.upstream_params();
    let key = format!(
        "hotels:list:{}",
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&params)
            .finish()
    );

    let page = match state.cache.get::<HotelPage>(&key).await {
        Some(page) => page,
        None => {
            let page = state
                .hotels
                .list(&params)
                .await
                .map_err(|e| ApiError::upstream(e, "Failed to load hotels"))?;
            state.cache.insert(&key, vec![CacheTag::HotelList], &page).await;
            page
        }
    };

    debug!("Browse page {} returned {} of {} hotels", filters.page, page.hotels.len(), page.total);
    Ok(Json(BrowseResponse {
        query: filters.to_query(),
        chips: filters.chips(),
        hotels: page.hotels,
        total: page.total,
        total_pages: page.total_pages,
        page: filters.page,
        page_size: BROWSE_PAGE_SIZE,
        filters,
    }))
}

/// Handler for POST /api/hotels/filters
/// Applies a filter action to the filters in the query string
#[utoipa::path(
    post,
    path = "/api/hotels/filters",
    responses(
        (status = 200, description = "Filters after the action", body = FilterStateResponse),
        (status = 422, description = "Unknown action")
    ),
    tag = "hotels"
)]
pub async fn apply_filter_action(
    RawQuery(raw): RawQuery,
    Json(action): Json<FilterAction>,
) -> Json<FilterStateResponse> {
    let current = FilterState::from_query(raw.as_deref().unwrap_or_default());
    debug!("Applying filter action {:?} to '{}'", action, current);
    Json(action.apply(current).into())
}

/// Handler for GET /api/hotels/:id
/// Retrieves one hotel, served from the cache when fresh
#[utoipa::path(
    get,
    path = "/api/hotels/{id}",
    params(("id" = String, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel found", body = Hotel),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 502, description = "Hotel API unavailable", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn get_hotel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Hotel>, ApiError> {
    let key = format!("hotels:{}", id);
    if let Some(hotel) = state.cache.get::<Hotel>(&key).await {
        return Ok(Json(hotel));
    }

    let hotel = state.hotels.get_by_id(&id).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound {
                resource: "Hotel".to_string(),
                id: id.clone(),
            }
        } else {
            ApiError::upstream(e, "Failed to load hotel")
        }
    })?;

    state.cache.insert(&key, vec![CacheTag::Hotel(id)], &hotel).await;
    Ok(Json(hotel))
}

/// Handler for GET /api/locations
/// Lists the known locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All locations", body = Vec<Location>),
        (status = 502, description = "Hotel API unavailable", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
    const KEY: &str = "locations";
    if let Some(locations) = state.cache.get::<Vec<Location>>(KEY).await {
        return Ok(Json(locations));
    }

    let locations = state
        .hotels
        .list_locations()
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to load locations"))?;
    state.cache.insert(KEY, vec![CacheTag::Locations], &locations).await;
    Ok(Json(locations))
}

/// Handler for POST /api/admin/hotels
/// Adds a hotel to the catalog (Admin only)
#[utoipa::path(
    post,
    path = "/api/admin/hotels",
    request_body = NewHotel,
    responses(
        (status = 201, description = "Hotel created", body = Hotel),
        (status = 400, description = "Invalid hotel", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<NewHotel>,
) -> Result<(StatusCode, Json<Hotel>), ApiError> {
    request.validate()?;

    let hotel = state
        .hotels
        .create_hotel(&admin.token, &request)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to create hotel"))?;
    state.cache.invalidate(&[CacheTag::HotelList]).await;

    info!("Admin {} created hotel {}", admin.user_id, hotel.id);
    Ok((StatusCode::CREATED, Json(hotel)))
}

/// Handler for POST /api/admin/locations
/// Adds a location tab (Admin only)
#[utoipa::path(
    post,
    path = "/api/admin/locations",
    request_body = NewLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid location", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_location(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut request): Json<NewLocation>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    request.validate()?;
    request.name = request.name.trim().to_string();

    let location = state
        .hotels
        .add_location(&admin.token, &request)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to add location"))?;
    state.cache.invalidate(&[CacheTag::Locations]).await;

    info!("Admin {} added location {}", admin.user_id, location.name);
    Ok((StatusCode::CREATED, Json(location)))
}
