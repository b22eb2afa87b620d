// HTTP handlers for hotel reviews

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::client::{review_mutation_tags, CacheTag};
use crate::error::ApiError;
use crate::models::Review;
use crate::reviews::{HotelReviews, NewReview};
use crate::state::AppState;

/// Handler for GET /api/hotels/:id/reviews
/// Lists a hotel's reviews with their count and mean rating
#[utoipa::path(
    get,
    path = "/api/hotels/{id}/reviews",
    params(("id" = String, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Reviews of the hotel", body = HotelReviews),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 502, description = "Review API unavailable", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn list_hotel_reviews(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
) -> Result<Json<HotelReviews>, ApiError> {
    let key = format!("reviews:hotel:{}", hotel_id);

    let reviews = match state.cache.get::<Vec<Review>>(&key).await {
        Some(reviews) => reviews,
        None => {
            let reviews = state.hotels.reviews_for_hotel(&hotel_id).await.map_err(|e| {
                if e.is_not_found() {
                    ApiError::NotFound {
                        resource: "Hotel".to_string(),
                        id: hotel_id.clone(),
                    }
                } else {
                    ApiError::upstream(e, "Failed to load reviews")
                }
            })?;
            state
                .cache
                .insert(&key, vec![CacheTag::Reviews(hotel_id.clone()), CacheTag::Hotel(hotel_id.clone())], &reviews)
                .await;
            reviews
        }
    };

    debug!("Hotel {} has {} reviews", hotel_id, reviews.len());
    Ok(Json(HotelReviews::new(hotel_id, reviews)))
}

/// Handler for POST /api/reviews
/// Adds a review; reviews cannot be edited or removed afterwards
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = NewReview,
    responses(
        (status = 201, description = "Review added", body = Review),
        (status = 400, description = "Invalid review", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(mut request): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    request.validate()?;
    request.comment = request.comment.trim().to_string();
    if request.user_name.as_deref().map_or(true, |name| name.trim().is_empty()) {
        request.user_name = Some(user.user_id.clone());
    }

    let review = state
        .hotels
        .add_review(&user.token, &request)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to add review"))?;
    state.cache.invalidate(&review_mutation_tags(&request.hotel_id)).await;

    info!("User {} reviewed hotel {}", user.user_id, request.hotel_id);
    Ok((StatusCode::CREATED, Json(review)))
}
