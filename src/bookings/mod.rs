// Booking history, admin management and the cancellation policy
//
// Bookings live in the remote Booking API. This module filters them, decides
// which actions a booking still allows and guards the mutating calls.

pub mod error;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod stats;

pub use error::BookingError;
pub use filters::{AdminBookingFilter, AdminBookingQuery, HistoryFilter, HistoryQuery};
pub use models::{
    Booking, BookingStatus, BookingView, ConfirmBookingRequest, HotelRef, HotelSummary, NewBooking,
    PaymentStatus, UpdateBookingRequest, UpdateStatusRequest,
};
pub use policy::{BookingPolicy, CANCELLATION_NOTICE_HOURS};
pub use stats::BookingStats;
