// Search session store
//
// Single source of truth for the current search: query text, override
// matches, derived criteria and the raw result pages. State changes only
// through `SearchState::dispatch`; the registry serializes writers per
// process with a write lock.

use serde::Serialize;
use serde_json::Value;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::client::AiSearchResponse;
use crate::models::Hotel;
use crate::search::criteria::SearchCriteria;
use crate::search::extractor::CriteriaExtractor;
use crate::search::pipeline::is_search_mode;

/// Monotonic identifier handed out for every search or load-more request
pub type RequestId = u64;

/// Session id used when a client does not send one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Errors raised when an action is not allowed in the current state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Search query must not be blank")]
    BlankQuery,

    #[error("A search is already in progress")]
    SearchInProgress,

    #[error("More results are already loading")]
    LoadMoreInProgress,

    #[error("There is no search to load more results for")]
    NoActiveSearch,
}

/// Actions accepted by the store
#[derive(Debug, Clone)]
pub enum SearchAction {
    SetQuery(String),
    ResetQuery,
    SetMatchedHotels(Vec<Hotel>),
    ClearMatchedHotels,
    SetCriteria(SearchCriteria),
    ClearCriteria,
    ClearSearch,
    SearchStarted { query: String },
    SearchSucceeded { request_id: RequestId, response: AiSearchResponse },
    SearchFailed { request_id: RequestId, message: String },
    LoadMoreStarted,
    LoadMoreSucceeded { request_id: RequestId, results: Vec<Hotel> },
    LoadMoreFailed { request_id: RequestId },
}

/// What a dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// A request was started; its response must carry this id
    Started(RequestId),
    /// A response for a superseded request was discarded
    Stale,
}

/// State of one search session
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    pub matched_hotels: Vec<Hotel>,
    pub criteria: SearchCriteria,
    pub response_text: String,
    #[schema(value_type = Vec<Object>)]
    pub recommendations: Vec<Value>,
    pub results: Vec<Hotel>,
    pub total_count: u64,
    pub page: u32,
    pub in_flight: Option<RequestId>,
    pub loading_more: Option<RequestId>,
    pub last_error: Option<String>,
    #[serde(skip)]
    last_request_id: RequestId,
}

impl SearchState {
    /// Whether listing views should run in search mode
    pub fn is_search_mode(&self) -> bool {
        is_search_mode(&self.query, &self.matched_hotels, &self.criteria)
    }

    /// Page number a load-more request should ask for
    pub fn next_page(&self) -> u32 {
        self.page.max(1) + 1
    }

    fn issue_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    /// Clears every derived field, keeping the request counter
    fn clear_results(&mut self) {
        self.matched_hotels.clear();
        self.criteria = SearchCriteria::default();
        self.response_text.clear();
        self.recommendations.clear();
        self.results.clear();
        self.total_count = 0;
        self.page = 1;
    }

    /// Applies `action`, rejecting actions the current state does not allow
    pub fn dispatch(&mut self, action: SearchAction) -> Result<Dispatch, SessionError> {
        match action {
            SearchAction::SetQuery(query) => self.query = query,
            SearchAction::ResetQuery => self.query.clear(),
            SearchAction::SetMatchedHotels(hotels) => self.matched_hotels = hotels,
            SearchAction::ClearMatchedHotels => self.matched_hotels.clear(),
            SearchAction::SetCriteria(criteria) => self.criteria = criteria,
            SearchAction::ClearCriteria => self.criteria = SearchCriteria::default(),
            SearchAction::ClearSearch => {
                self.query.clear();
                self.clear_results();
                self.in_flight = None;
                self.loading_more = None;
                self.last_error = None;
            }
            SearchAction::SearchStarted { query } => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    return Err(SessionError::BlankQuery);
                }
                if self.in_flight.is_some() || self.loading_more.is_some() {
                    return Err(SessionError::SearchInProgress);
                }
                self.clear_results();
                self.query = query;
                self.last_error = None;
                let id = self.issue_request_id();
                self.in_flight = Some(id);
                return Ok(Dispatch::Started(id));
            }
            SearchAction::SearchSucceeded { request_id, response } => {
                if self.in_flight != Some(request_id) {
                    return Ok(Dispatch::Stale);
                }
                self.in_flight = None;
                self.criteria = CriteriaExtractor::extract(Some(&response.response));
                self.response_text = response.response;
                self.recommendations = response.recommendations;
                self.matched_hotels = response.matched_hotels;
                self.results = response.results;
                self.total_count = response.total_count;
                self.page = 1;
            }
            SearchAction::SearchFailed { request_id, message } => {
                if self.in_flight != Some(request_id) {
                    return Ok(Dispatch::Stale);
                }
                self.in_flight = None;
                self.clear_results();
                self.response_text = message.clone();
                self.last_error = Some(message);
            }
            SearchAction::LoadMoreStarted => {
                if self.query.trim().is_empty() {
                    return Err(SessionError::NoActiveSearch);
                }
                if self.in_flight.is_some() {
                    return Err(SessionError::SearchInProgress);
                }
                if self.loading_more.is_some() {
                    return Err(SessionError::LoadMoreInProgress);
                }
                let id = self.issue_request_id();
                self.loading_more = Some(id);
                return Ok(Dispatch::Started(id));
            }
            SearchAction::LoadMoreSucceeded { request_id, results } => {
                if self.loading_more != Some(request_id) {
                    return Ok(Dispatch::Stale);
                }
                self.loading_more = None;
                self.results.extend(results);
                self.page = self.next_page();
            }
            SearchAction::LoadMoreFailed { request_id } => {
                if self.loading_more != Some(request_id) {
                    return Ok(Dispatch::Stale);
                }
                self.loading_more = None;
            }
        }
        Ok(Dispatch::Applied)
    }
}

/// Most sessions kept at once before the least recently used is evicted
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// How long a session may sit untouched before it is dropped
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

const MIN_SESSION_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug)]
struct SessionEntry {
    state: SearchState,
    touched_at: Instant,
}

impl SessionEntry {
    fn new(state: SearchState) -> Self {
        Self {
            state,
            touched_at: Instant::now(),
        }
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.touched_at.elapsed() >= ttl
    }
}

#[derive(Debug)]
struct Sessions {
    entries: LruCache<String, SessionEntry>,
    /// Highest request id handed out by any session, evicted ones included
    last_request_id: RequestId,
}

/// Search sessions keyed by client session id
///
/// Sessions live in an LRU bounded by capacity and idle TTL. Request ids are
/// unique across the registry, so a response that outlives its session can
/// never be mistaken for one belonging to a recreated session.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<Sessions>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TTL)
    }

    pub fn with_limits(capacity: usize, idle_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(MIN_SESSION_CAPACITY);
        Self {
            sessions: RwLock::new(Sessions {
                entries: LruCache::new(capacity),
                last_request_id: 0,
            }),
            idle_ttl,
        }
    }

    /// Dispatches `action` to the session under a write lock
    ///
    /// Clearing removes the session. Responses for a session that no longer
    /// exists are stale and never recreate it.
    pub async fn dispatch(&self, session_id: &str, action: SearchAction) -> Result<Dispatch, SessionError> {
        let mut sessions = self.sessions.write().await;
        let Sessions { entries, last_request_id } = &mut *sessions;

        if entries.get(session_id).is_some_and(|entry| entry.is_idle(self.idle_ttl)) {
            entries.pop(session_id);
            debug!("Dropped idle search session {}", session_id);
        }

        let outcome = match action {
            SearchAction::ClearSearch => {
                entries.pop(session_id);
                Ok(Dispatch::Applied)
            }
            SearchAction::SearchSucceeded { .. }
            | SearchAction::SearchFailed { .. }
            | SearchAction::LoadMoreSucceeded { .. }
            | SearchAction::LoadMoreFailed { .. }
                if !entries.contains(session_id) =>
            {
                Ok(Dispatch::Stale)
            }
            action => {
                if !entries.contains(session_id) {
                    if let Some((evicted, _)) = entries.push(session_id.to_string(), SessionEntry::new(SearchState::default())) {
                        if evicted != session_id {
                            debug!("Evicted least recently used search session {}", evicted);
                        }
                    }
                }
                match entries.get_mut(session_id) {
                    Some(entry) => {
                        entry.touched_at = Instant::now();
                        entry.state.last_request_id = entry.state.last_request_id.max(*last_request_id);
                        let outcome = entry.state.dispatch(action);
                        *last_request_id = entry.state.last_request_id;
                        outcome
                    }
                    None => Ok(Dispatch::Stale),
                }
            }
        };

        match &outcome {
            Ok(Dispatch::Stale) => {
                warn!("Discarded stale search response for session {}", session_id)
            }
            Err(e) => debug!("Rejected search action for session {}: {}", session_id, e),
            Ok(_) => {}
        }
        outcome
    }

    /// Copy of the session state; unknown or idle sessions read as empty
    pub async fn snapshot(&self, session_id: &str) -> SearchState {
        let mut sessions = self.sessions.write().await;
        match sessions.entries.get_mut(session_id) {
            Some(entry) if !entry.is_idle(self.idle_ttl) => {
                entry.touched_at = Instant::now();
                entry.state.clone()
            }
            _ => SearchState::default(),
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every session idle for longer than the TTL
    pub async fn purge_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<String> = sessions
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_idle(self.idle_ttl))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &idle {
            sessions.entries.pop(id);
        }
        drop(sessions);

        if !idle.is_empty() {
            debug!("Purged {} idle search sessions", idle.len());
        }
        idle.len()
    }
}
