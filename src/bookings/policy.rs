use chrono::{DateTime, Duration, Utc};

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, BookingStatus, BookingView};

/// Minimum notice before check-in for a guest cancellation, in hours
pub const CANCELLATION_NOTICE_HOURS: i64 = 24;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Rules deciding which actions a booking allows
pub struct BookingPolicy;

impl BookingPolicy {
    /// Check if a guest may cancel the booking at `now`
    ///
    /// # Rules
    /// - Cancelled and completed bookings cannot be cancelled
    /// - Check-in must be at least 24 hours away (exactly 24 hours is allowed)
    pub fn can_cancel(booking: &Booking, now: DateTime<Utc>) -> bool {
        !booking.status.is_final()
            && booking.check_in - now >= Duration::hours(CANCELLATION_NOTICE_HOURS)
    }

    /// Check if a guest may edit the booking
    pub fn can_edit(booking: &Booking) -> bool {
        !booking.status.is_final()
    }

    /// Check if an admin may confirm the booking
    pub fn can_confirm(booking: &Booking) -> bool {
        booking.status == BookingStatus::Pending
    }

    /// Number of nights, counting a partial day as a full night
    pub fn nights(booking: &Booking) -> i64 {
        let millis = (booking.check_out - booking.check_in).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }

    pub fn ensure_cancellable(booking: &Booking, now: DateTime<Utc>) -> Result<(), BookingError> {
        if booking.status.is_final() {
            return Err(BookingError::NotAllowed(format!(
                "A {} booking cannot be cancelled",
                booking.status.as_str().to_lowercase()
            )));
        }
        if !Self::can_cancel(booking, now) {
            return Err(BookingError::NotAllowed(format!(
                "Bookings can only be cancelled at least {} hours before check-in",
                CANCELLATION_NOTICE_HOURS
            )));
        }
        Ok(())
    }

    pub fn ensure_editable(booking: &Booking) -> Result<(), BookingError> {
        if Self::can_edit(booking) {
            Ok(())
        } else {
            Err(BookingError::NotAllowed(format!(
                "A {} booking cannot be edited",
                booking.status.as_str().to_lowercase()
            )))
        }
    }

    pub fn ensure_confirmable(booking: &Booking) -> Result<(), BookingError> {
        if Self::can_confirm(booking) {
            Ok(())
        } else {
            Err(BookingError::NotAllowed(format!(
                "Only pending bookings can be confirmed, this one is {}",
                booking.status.as_str().to_lowercase()
            )))
        }
    }

    /// Attaches the allowed actions to `booking`
    pub fn annotate(booking: Booking, now: DateTime<Utc>) -> BookingView {
        BookingView {
            can_cancel: Self::can_cancel(&booking, now),
            can_edit: Self::can_edit(&booking),
            can_confirm: Self::can_confirm(&booking),
            nights: Self::nights(&booking),
            booking,
        }
    }
}
