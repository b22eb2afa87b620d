// Validation utilities module
// Provides custom validation functions for request bodies

use chrono::NaiveDate;
use validator::ValidationError;

use crate::bookings::{NewBooking, UpdateBookingRequest};

/// Validates that a required text field (an id or a name) has at least one visible character
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

/// Validates that check-out falls strictly after check-in
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ValidationError> {
    if check_out <= check_in {
        Err(ValidationError::new("check_out_must_follow_check_in"))
    } else {
        Ok(())
    }
}

/// Struct-level date check for new bookings
pub fn validate_new_booking_dates(booking: &NewBooking) -> Result<(), ValidationError> {
    validate_stay(booking.check_in, booking.check_out)
}

/// Struct-level date check for edits; only applies when both dates are sent
pub fn validate_update_booking_dates(update: &UpdateBookingRequest) -> Result<(), ValidationError> {
    match (update.check_in, update.check_out) {
        (Some(check_in), Some(check_out)) => validate_stay(check_in, check_out),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("beach").is_ok());
        assert!(validate_not_blank("  spa ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t ").is_err());
    }

    #[test]
    fn test_validate_stay() {
        assert!(validate_stay(date(2026, 1, 1), date(2026, 1, 2)).is_ok());
        assert!(validate_stay(date(2026, 1, 2), date(2026, 1, 2)).is_err());
        assert!(validate_stay(date(2026, 1, 3), date(2026, 1, 2)).is_err());
    }

    #[test]
    fn test_new_booking_rules() {
        use validator::Validate;

        let mut booking = NewBooking {
            hotel_id: "h1".into(),
            check_in: date(2026, 3, 1),
            check_out: date(2026, 3, 4),
            room_number: None,
            guest_count: 2,
            special_requests: None,
        };
        assert!(booking.validate().is_ok());

        booking.hotel_id = "   ".into();
        assert!(booking.validate().is_err());

        booking.hotel_id = "h1".into();
        booking.guest_count = 0;
        assert!(booking.validate().is_err());
    }

    #[test]
    fn test_partial_update_skips_date_check() {
        let update = UpdateBookingRequest {
            check_out: Some(date(2026, 1, 1)),
            ..Default::default()
        };
        assert!(validate_update_booking_dates(&update).is_ok());
    }
}
