// Hotel listings gateway
//
// Serves the hotel search, browse and booking views on top of the remote
// Hotel/Search and Booking APIs.

pub mod auth;
pub mod bookings;
pub mod browse;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod reviews;
pub mod routes;
pub mod search;
pub mod state;
pub mod validation;

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
