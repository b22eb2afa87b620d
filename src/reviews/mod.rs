pub mod handlers;
pub mod models;

pub use models::*;
