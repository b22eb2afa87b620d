// Application state shared across handlers

use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::client::{BookingApi, HotelApi, QueryCache};
use crate::search::session::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub hotels: Arc<dyn HotelApi>,
    pub bookings: Arc<dyn BookingApi>,
    pub cache: QueryCache,
    pub sessions: Arc<SessionRegistry>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        hotels: Arc<dyn HotelApi>,
        bookings: Arc<dyn BookingApi>,
        cache: QueryCache,
        tokens: TokenVerifier,
    ) -> Self {
        Self {
            hotels,
            bookings,
            cache,
            sessions: Arc::new(SessionRegistry::new()),
            tokens: Arc::new(tokens),
        }
    }

    /// Replaces the default session store
    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
