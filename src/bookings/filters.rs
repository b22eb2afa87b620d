// Booking list filters
//
// The admin list filters on a free-text term plus status and payment
// selectors; the guest history filters on payment status and a creation
// date range. "ALL" or an absent value means no constraint.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, BookingStatus, PaymentStatus};

/// Query parameters for the admin booking list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminBookingQuery {
    /// Matches hotel name, booking reference or user id
    pub search: Option<String>,
    /// Booking status or ALL
    pub status: Option<String>,
    /// Payment status or ALL
    pub payment_status: Option<String>,
}

/// Query parameters for the guest booking history
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Payment status or ALL
    pub payment_status: Option<String>,
    /// First creation date to include (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Last creation date to include (YYYY-MM-DD)
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminBookingFilter {
    search: Option<String>,
    status: Option<BookingStatus>,
    payment_status: Option<PaymentStatus>,
}

impl AdminBookingFilter {
    pub fn from_query(query: AdminBookingQuery) -> Result<Self, BookingError> {
        Ok(Self {
            search: normalize(query.search).map(|s| s.to_lowercase()),
            status: parse_choice(query.status)?,
            payment_status: parse_choice(query.payment_status)?,
        })
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.matches_search(booking)
            && self.status.map_or(true, |s| booking.status == s)
            && self.payment_status.map_or(true, |p| booking.payment_status == p)
    }

    fn matches_search(&self, booking: &Booking) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(term));

        contains(booking.hotel.name())
            || contains(booking.booking_reference.as_deref())
            || contains(Some(booking.user_id.as_str()))
    }

    pub fn apply(&self, bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.into_iter().filter(|b| self.matches(b)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    payment_status: Option<PaymentStatus>,
    created_from: Option<DateTime<Utc>>,
    created_until: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    pub fn from_query(query: HistoryQuery) -> Result<Self, BookingError> {
        let start = parse_date(query.start_date, "startDate")?;
        let end = parse_date(query.end_date, "endDate")?;

        Ok(Self {
            payment_status: parse_choice(query.payment_status)?,
            created_from: start.map(|d| at_utc(d, NaiveTime::MIN)),
            // The end date covers its whole day
            created_until: end
                .and_then(|d| NaiveTime::from_hms_milli_opt(23, 59, 59, 999).map(|t| at_utc(d, t))),
        })
    }

    /// Bookings without a creation time fail any date bound
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(payment) = self.payment_status {
            if booking.payment_status != payment {
                return false;
            }
        }
        if self.created_from.is_none() && self.created_until.is_none() {
            return true;
        }
        let Some(created) = booking.created_at else {
            return false;
        };
        self.created_from.map_or(true, |from| created >= from)
            && self.created_until.map_or(true, |until| created <= until)
    }

    pub fn apply(&self, bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.into_iter().filter(|b| self.matches(b)).collect()
    }
}

fn at_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Trims whitespace and converts empty strings to None
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a status selector where blank or ALL means no constraint
fn parse_choice<T>(value: Option<String>) -> Result<Option<T>, BookingError>
where
    T: FromStr<Err = String>,
{
    match normalize(value) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(BookingError::InvalidFilter),
    }
}

fn parse_date(value: Option<String>, name: &str) -> Result<Option<NaiveDate>, BookingError> {
    normalize(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| BookingError::InvalidFilter(format!("{} must be a YYYY-MM-DD date", name)))
        })
        .transpose()
}
