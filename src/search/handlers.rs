// HTTP handlers for the search session and listing views

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::client::{AiSearchRequest, CacheTag};
use crate::error::ApiError;
use crate::models::Hotel;
use crate::search::criteria::SearchCriteria;
use crate::search::extractor::CriteriaExtractor;
use crate::search::location::LocationSelection;
use crate::search::pipeline::{home_listing, paginate, search_results, ListingInput};
use crate::search::session::{Dispatch, RequestId, SearchAction, SearchState, SessionError, DEFAULT_SESSION_ID};
use crate::search::sort::SortKey;
use crate::state::AppState;

/// Header carrying the client's search session id
pub const SESSION_HEADER: &str = "x-session-id";

const AI_SEARCH_FAILED: &str = "Could not get AI response. Try again.";
const LOAD_MORE_FAILED: &str = "Could not load more results.";
const TEXT_SEARCH_FAILED: &str = "Failed to search hotels";
const HOTEL_LIST_FAILED: &str = "Failed to load hotels";

const DEFAULT_LISTING_PAGE_SIZE: u32 = 12;
const MAX_LISTING_PAGE_SIZE: u32 = 100;

/// Search session id taken from `x-session-id`; missing or blank means the default session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID);
        Ok(SessionId(id.to_string()))
    }
}

/// Request body for starting an AI search
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    #[validate(length(max = 500, message = "Search query must be at most 500 characters"))]
    pub query: String,
}

/// Request body for previewing extracted criteria
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CriteriaRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Query parameters of the home listing view
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingsQuery {
    /// Country tab; "All" or absent selects every hotel
    pub location: Option<String>,
    /// featured, price-asc, price-desc, rating-desc or name-asc
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// One page of the home listing view
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingsResponse {
    pub hotels: Vec<Hotel>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub sort_by: SortKey,
    pub search_mode: bool,
    pub criteria: SearchCriteria,
}

/// Query parameters of the search-results view
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchResultsQuery {
    /// Text query; defaults to the session query
    pub query: Option<String>,
}

/// Text-search hits narrowed by the session's AI criteria
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsResponse {
    pub query: String,
    pub hotels: Vec<Hotel>,
    pub criteria: SearchCriteria,
}

fn request_id(outcome: Dispatch) -> Result<RequestId, ApiError> {
    match outcome {
        Dispatch::Started(id) => Ok(id),
        other => Err(ApiError::InternalError(format!("Search request was not started: {:?}", other))),
    }
}

/// Runs the AI search and records the outcome in the session
///
/// Spawned so the session is settled even if the caller disconnects.
async fn run_search(state: AppState, session_id: String, request_id: RequestId, query: String) -> Result<(), ApiError> {
    match state.hotels.ai_search(&AiSearchRequest::new(&query, 1)).await {
        Ok(response) => {
            info!(
                "AI search for session {} returned {} results ({} matched)",
                session_id,
                response.results.len(),
                response.matched_hotels.len()
            );
            state
                .sessions
                .dispatch(&session_id, SearchAction::SearchSucceeded { request_id, response })
                .await?;
            Ok(())
        }
        Err(e) => {
            let message = e.user_message(AI_SEARCH_FAILED);
            state
                .sessions
                .dispatch(&session_id, SearchAction::SearchFailed { request_id, message })
                .await?;
            Err(ApiError::upstream(e, AI_SEARCH_FAILED))
        }
    }
}

async fn run_load_more(
    state: AppState,
    session_id: String,
    request_id: RequestId,
    query: String,
    page: u32,
) -> Result<(), ApiError> {
    match state.hotels.ai_search(&AiSearchRequest::new(&query, page)).await {
        Ok(response) => {
            debug!("Loaded page {} for session {}: {} results", page, session_id, response.results.len());
            state
                .sessions
                .dispatch(
                    &session_id,
                    SearchAction::LoadMoreSucceeded {
                        request_id,
                        results: response.results,
                    },
                )
                .await?;
            Ok(())
        }
        Err(e) => {
            warn!("Load more failed for session {}: {}", session_id, e);
            state
                .sessions
                .dispatch(&session_id, SearchAction::LoadMoreFailed { request_id })
                .await?;
            Err(ApiError::upstream(e, LOAD_MORE_FAILED))
        }
    }
}

/// Awaits a spawned session task, flattening join failures
async fn settle(task: tokio::task::JoinHandle<Result<(), ApiError>>) -> Result<(), ApiError> {
    task.await
        .map_err(|e| ApiError::InternalError(format!("Search task failed: {}", e)))?
}

/// Handler for POST /api/search
/// Starts an AI search for the session; a blank query leaves the session untouched
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    params(("x-session-id" = Option<String>, Header, description = "Search session id")),
    responses(
        (status = 200, description = "Session after the search", body = SearchState),
        (status = 409, description = "A search is already in progress", body = ErrorResponse),
        (status = 502, description = "AI search failed", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn start_search(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchState>, ApiError> {
    request.validate()?;
    debug!("Starting AI search for session {}: {}", session_id, request.query);

    let outcome = state
        .sessions
        .dispatch(
            &session_id,
            SearchAction::SearchStarted {
                query: request.query.clone(),
            },
        )
        .await;

    let request_id = match outcome {
        Err(SessionError::BlankQuery) => {
            debug!("Ignoring blank search for session {}", session_id);
            return Ok(Json(state.sessions.snapshot(&session_id).await));
        }
        other => request_id(other?)?,
    };

    let task = tokio::spawn(run_search(
        state.clone(),
        session_id.clone(),
        request_id,
        request.query.trim().to_string(),
    ));
    settle(task).await?;

    Ok(Json(state.sessions.snapshot(&session_id).await))
}

/// Handler for POST /api/search/more
/// Appends the next page of AI search results
#[utoipa::path(
    post,
    path = "/api/search/more",
    params(("x-session-id" = Option<String>, Header, description = "Search session id")),
    responses(
        (status = 200, description = "Session with the appended page", body = SearchState),
        (status = 409, description = "No active search or a request is already loading", body = ErrorResponse),
        (status = 502, description = "Loading more results failed", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn load_more(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> Result<Json<SearchState>, ApiError> {
    let request_id = request_id(
        state
            .sessions
            .dispatch(&session_id, SearchAction::LoadMoreStarted)
            .await?,
    )?;

    let snapshot = state.sessions.snapshot(&session_id).await;
    let page = snapshot.next_page();
    debug!("Loading page {} for session {}", page, session_id);

    let task = tokio::spawn(run_load_more(
        state.clone(),
        session_id.clone(),
        request_id,
        snapshot.query,
        page,
    ));
    settle(task).await?;

    Ok(Json(state.sessions.snapshot(&session_id).await))
}

/// Handler for GET /api/search
/// Returns the current session state
#[utoipa::path(
    get,
    path = "/api/search",
    params(("x-session-id" = Option<String>, Header, description = "Search session id")),
    responses((status = 200, description = "Current session", body = SearchState)),
    tag = "search"
)]
pub async fn get_search(State(state): State<AppState>, SessionId(session_id): SessionId) -> Json<SearchState> {
    Json(state.sessions.snapshot(&session_id).await)
}

/// Handler for DELETE /api/search
/// Clears the query, matches, criteria and results of the session
#[utoipa::path(
    delete,
    path = "/api/search",
    params(("x-session-id" = Option<String>, Header, description = "Search session id")),
    responses((status = 204, description = "Session cleared")),
    tag = "search"
)]
pub async fn clear_search(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .dispatch(&session_id, SearchAction::ClearSearch)
        .await?;
    info!("Cleared search session {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/search/criteria
/// Extracts structured criteria from free text without touching the session
#[utoipa::path(
    post,
    path = "/api/search/criteria",
    request_body = CriteriaRequest,
    responses((status = 200, description = "Extracted criteria", body = SearchCriteria)),
    tag = "search"
)]
pub async fn extract_criteria(Json(request): Json<CriteriaRequest>) -> Json<SearchCriteria> {
    Json(CriteriaExtractor::extract(request.text.as_deref()))
}

/// Full hotel catalog, served from the query cache when fresh
pub(crate) async fn hotel_catalog(state: &AppState) -> Result<Vec<Hotel>, ApiError> {
    const KEY: &str = "hotels:list:all";

    if let Some(hotels) = state.cache.get::<Vec<Hotel>>(KEY).await {
        return Ok(hotels);
    }

    let page = state
        .hotels
        .list(&[])
        .await
        .map_err(|e| ApiError::upstream(e, HOTEL_LIST_FAILED))?;
    state.cache.insert(KEY, vec![CacheTag::HotelList], &page.hotels).await;
    Ok(page.hotels)
}

/// Handler for GET /api/listings
/// Home view: location tab, session criteria or override list, then sort
#[utoipa::path(
    get,
    path = "/api/listings",
    params(
        ListingsQuery,
        ("x-session-id" = Option<String>, Header, description = "Search session id")
    ),
    responses(
        (status = 200, description = "One page of the home listing", body = ListingsResponse),
        (status = 502, description = "Hotel list unavailable", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn get_listings(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<ListingsResponse>, ApiError> {
    let hotels = hotel_catalog(&state).await?;
    let session = state.sessions.snapshot(&session_id).await;

    let location = LocationSelection::from_name(query.location.as_deref());
    let sort = query.sort_by.as_deref().map(SortKey::parse).unwrap_or_default();
    let search_mode = session.is_search_mode();

    let listing = home_listing(&ListingInput {
        hotels: &hotels,
        criteria: &session.criteria,
        matched: &session.matched_hotels,
        location: &location,
        sort,
        search_mode,
    });

    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_LISTING_PAGE_SIZE)
        .clamp(1, MAX_LISTING_PAGE_SIZE);
    let page = paginate(&listing, query.page.unwrap_or(1), page_size);
    debug!(
        "Listing for session {}: {} of {} hotels (search_mode={}, sort={})",
        session_id,
        page.items.len(),
        page.total,
        search_mode,
        sort
    );

    Ok(Json(ListingsResponse {
        hotels: page.items,
        page: page.page,
        page_size: page.page_size,
        total: page.total,
        total_pages: page.total_pages,
        sort_by: sort,
        search_mode,
        criteria: session.criteria,
    }))
}

/// Handler for GET /api/search/results
/// Search-results view: text search hits narrowed by the session's AI criteria
#[utoipa::path(
    get,
    path = "/api/search/results",
    params(
        SearchResultsQuery,
        ("x-session-id" = Option<String>, Header, description = "Search session id")
    ),
    responses(
        (status = 200, description = "Filtered search results", body = SearchResultsResponse),
        (status = 502, description = "Text search failed", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn get_search_results(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Query(params): Query<SearchResultsQuery>,
) -> Result<Json<SearchResultsResponse>, ApiError> {
    let session = state.sessions.snapshot(&session_id).await;
    let query = params
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| session.query.trim().to_string());

    if query.is_empty() {
        return Ok(Json(SearchResultsResponse {
            query,
            hotels: Vec::new(),
            criteria: session.criteria,
        }));
    }

    let hits = state
        .hotels
        .search_by_text(&query)
        .await
        .map_err(|e| ApiError::upstream(e, TEXT_SEARCH_FAILED))?;
    let hotels = search_results(&hits, &session.criteria, &session.matched_hotels);
    debug!("Text search '{}' returned {} hits, {} after filters", query, hits.len(), hotels.len());

    Ok(Json(SearchResultsResponse {
        query,
        hotels,
        criteria: session.criteria,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn session_id_for(header: Option<&str>) -> String {
        let mut builder = Request::builder().uri("/api/search");
        if let Some(value) = header {
            builder = builder.header(SESSION_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let SessionId(id) = SessionId::from_request_parts(&mut parts, &()).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_session_id_from_header() {
        assert_eq!(session_id_for(Some("tab-7")).await, "tab-7");
        assert_eq!(session_id_for(Some("  tab-7 ")).await, "tab-7");
    }

    #[tokio::test]
    async fn test_session_id_defaults() {
        assert_eq!(session_id_for(None).await, DEFAULT_SESSION_ID);
        assert_eq!(session_id_for(Some("   ")).await, DEFAULT_SESSION_ID);
    }

    #[test]
    fn test_request_id_requires_started() {
        assert_eq!(request_id(Dispatch::Started(4)).unwrap(), 4);
        assert!(request_id(Dispatch::Applied).is_err());
    }

    #[test]
    fn test_search_request_length_limit() {
        let request = SearchRequest { query: "a".repeat(501) };
        assert!(request.validate().is_err());
        let request = SearchRequest { query: "beach hotel".into() };
        assert!(request.validate().is_ok());
    }
}
