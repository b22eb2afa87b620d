use serde::Serialize;
use utoipa::ToSchema;

use crate::bookings::models::{Booking, BookingStatus, PaymentStatus};

/// Account dashboard totals over a guest's bookings
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: usize,
    /// Confirmed or completed stays
    pub completed: usize,
    /// Bookings awaiting confirmation or payment
    pub pending: usize,
    /// Sum of `totalPrice` over paid bookings
    pub total_spent: f64,
}

impl BookingStats {
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        Self {
            total: bookings.len(),
            completed: bookings
                .iter()
                .filter(|b| matches!(b.status, BookingStatus::Completed | BookingStatus::Confirmed))
                .count(),
            pending: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending || b.payment_status == PaymentStatus::Pending)
                .count(),
            total_spent: bookings
                .iter()
                .filter(|b| b.payment_status == PaymentStatus::Paid)
                .map(|b| b.total_price)
                .sum(),
        }
    }
}
