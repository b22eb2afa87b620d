// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::bookings::{
    AdminBookingFilter, AdminBookingQuery, Booking, BookingError, BookingPolicy, BookingStats, BookingView,
    ConfirmBookingRequest, HistoryFilter, HistoryQuery, NewBooking, UpdateBookingRequest, UpdateStatusRequest,
};
use crate::client::{booking_mutation_tags, CacheTag};
use crate::error::ApiError;
use crate::state::AppState;

fn annotate_all(bookings: Vec<Booking>) -> Vec<BookingView> {
    let now = Utc::now();
    bookings
        .into_iter()
        .map(|booking| BookingPolicy::annotate(booking, now))
        .collect()
}

/// Loads a booking straight from the Booking API, bypassing the cache
async fn fetch_booking(state: &AppState, token: &str, id: &str) -> Result<Booking, ApiError> {
    state
        .bookings
        .get_by_id(token, id)
        .await
        .map_err(|e| BookingError::lookup(e, id).into())
}

/// The caller's bookings, served from the cache when fresh
async fn my_bookings(state: &AppState, user: &AuthenticatedUser) -> Result<Vec<Booking>, ApiError> {
    let key = format!("bookings:me:{}", user.user_id);
    if let Some(bookings) = state.cache.get::<Vec<Booking>>(&key).await {
        return Ok(bookings);
    }

    let bookings = state
        .bookings
        .list_mine(&user.token)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to load bookings"))?;
    state.cache.insert(&key, vec![CacheTag::BookingList], &bookings).await;
    Ok(bookings)
}

/// Handler for GET /api/bookings/me
/// Lists the caller's bookings with the actions each one allows
#[utoipa::path(
    get,
    path = "/api/bookings/me",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Caller's bookings", body = Vec<BookingView>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let filter = HistoryFilter::from_query(query)?;
    let bookings = my_bookings(&state, &user).await?;

    let filtered = filter.apply(bookings);
    debug!("User {} has {} bookings after filters", user.user_id, filtered.len());
    Ok(Json(annotate_all(filtered)))
}

/// Handler for GET /api/bookings/me/stats
/// Account dashboard totals over the caller's bookings
#[utoipa::path(
    get,
    path = "/api/bookings/me/stats",
    responses(
        (status = 200, description = "Booking totals", body = BookingStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn get_booking_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<BookingStats>, ApiError> {
    let bookings = my_bookings(&state, &user).await?;
    Ok(Json(BookingStats::from_bookings(&bookings)))
}

/// Handler for GET /api/bookings/:id
/// Retrieves one of the caller's bookings
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = BookingView),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ApiError> {
    let key = format!("bookings:{}:{}", user.user_id, id);

    let booking = match state.cache.get::<Booking>(&key).await {
        Some(booking) => booking,
        None => {
            let booking = fetch_booking(&state, &user.token, &id).await?;
            state.cache.insert(&key, vec![CacheTag::Booking(id)], &booking).await;
            booking
        }
    };

    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}

/// Handler for GET /api/bookings/session/:session_id
/// Retrieves the booking created by a payment checkout session
#[utoipa::path(
    get,
    path = "/api/bookings/session/{session_id}",
    params(("session_id" = String, Path, description = "Checkout session ID")),
    responses(
        (status = 200, description = "Booking found", body = BookingView),
        (status = 404, description = "No booking for this session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn get_booking_by_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<Json<BookingView>, ApiError> {
    let booking = state
        .bookings
        .get_by_session_id(&user.token, &session_id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiError::NotFound {
                    resource: "Booking for checkout session".to_string(),
                    id: session_id.clone(),
                }
            } else {
                ApiError::upstream(e, "Failed to load booking")
            }
        })?;

    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}

/// Handler for POST /api/bookings
/// Creates a booking for the caller
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = NewBooking,
    responses(
        (status = 201, description = "Booking created", body = BookingView),
        (status = 400, description = "Invalid booking request", body = ErrorResponse),
        (status = 409, description = "Room not available", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<NewBooking>,
) -> Result<(StatusCode, Json<BookingView>), ApiError> {
    request.validate()?;
    debug!("User {} booking hotel {}", user.user_id, request.hotel_id);

    let booking = state
        .bookings
        .create(&user.token, &request)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to create booking"))?;

    state
        .cache
        .invalidate(&[
            CacheTag::Hotel(request.hotel_id.clone()),
            CacheTag::BookingList,
            CacheTag::Booking(booking.id.clone()),
        ])
        .await;

    info!("User {} created booking {}", user.user_id, booking.id);
    Ok((StatusCode::CREATED, Json(BookingPolicy::annotate(booking, Utc::now()))))
}

/// Handler for PATCH /api/bookings/:id
/// Edits a booking that is not cancelled or completed
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = BookingView),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking can no longer be edited", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn update_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<BookingView>, ApiError> {
    request.validate()?;

    let current = fetch_booking(&state, &user.token, &id).await?;
    BookingPolicy::ensure_editable(&current)?;

    let booking = state
        .bookings
        .update(&user.token, &id, &request)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to update booking"))?;
    state.cache.invalidate(&booking_mutation_tags(&id)).await;

    info!("User {} updated booking {}", user.user_id, id);
    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}

/// Handler for PATCH /api/bookings/:id/cancel
/// Cancels a booking at least 24 hours before check-in
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/cancel",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingView),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking can no longer be cancelled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ApiError> {
    let current = fetch_booking(&state, &user.token, &id).await?;
    BookingPolicy::ensure_cancellable(&current, Utc::now())?;

    let booking = state
        .bookings
        .cancel(&user.token, &id)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to cancel booking"))?;
    state.cache.invalidate(&booking_mutation_tags(&id)).await;

    info!("User {} cancelled booking {}", user.user_id, id);
    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}

/// Handler for GET /api/admin/bookings
/// Lists every booking, filtered by search term, status and payment status (Admin only)
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(AdminBookingQuery),
    responses(
        (status = 200, description = "Matching bookings", body = Vec<BookingView>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_all_bookings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<AdminBookingQuery>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let filter = AdminBookingFilter::from_query(query)?;
    const KEY: &str = "bookings:all";

    let bookings = match state.cache.get::<Vec<Booking>>(KEY).await {
        Some(bookings) => bookings,
        None => {
            let bookings = state
                .bookings
                .list_all(&admin.token)
                .await
                .map_err(|e| BookingError::upstream(e, "Failed to load bookings"))?;
            state.cache.insert(KEY, vec![CacheTag::BookingList], &bookings).await;
            bookings
        }
    };

    let filtered = filter.apply(bookings);
    debug!("Admin {} listed {} bookings", admin.user_id, filtered.len());
    Ok(Json(annotate_all(filtered)))
}

/// Handler for PATCH /api/admin/bookings/:id/confirm
/// Confirms a pending booking and emails the guest (Admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/confirm",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = ConfirmBookingRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = BookingView),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn confirm_booking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ConfirmBookingRequest>,
) -> Result<Json<BookingView>, ApiError> {
    request.validate()?;

    let current = fetch_booking(&state, &admin.token, &id).await?;
    BookingPolicy::ensure_confirmable(&current)?;

    let booking = state
        .bookings
        .confirm(&admin.token, &id, &request)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to confirm booking"))?;
    state.cache.invalidate(&booking_mutation_tags(&id)).await;

    info!("Admin {} confirmed booking {}", admin.user_id, id);
    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}

/// Handler for PATCH /api/admin/bookings/:id/status
/// Sets the booking status (Admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BookingView),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 422, description = "Unknown status")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<BookingView>, ApiError> {
    let booking = state
        .bookings
        .update_status(&admin.token, &id, request.status)
        .await
        .map_err(|e| BookingError::upstream(e, "Failed to update booking status"))?;
    state.cache.invalidate(&booking_mutation_tags(&id)).await;

    info!("Admin {} set booking {} to {}", admin.user_id, id, request.status);
    Ok(Json(BookingPolicy::annotate(booking, Utc::now())))
}
