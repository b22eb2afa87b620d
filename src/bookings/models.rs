use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_new_booking_dates, validate_not_blank, validate_update_booking_dates};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Cancelled and completed bookings accept no further changes
    pub fn is_final(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hotel fields the booking endpoints embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HotelSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Hotel reference of a booking: a bare id, or the populated hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum HotelRef {
    Summary(HotelSummary),
    Id(String),
}

impl HotelRef {
    pub fn id(&self) -> &str {
        match self {
            HotelRef::Summary(summary) => &summary.id,
            HotelRef::Id(id) => id,
        }
    }

    /// Hotel name, known only when the upstream populated the reference
    pub fn name(&self) -> Option<&str> {
        match self {
            HotelRef::Summary(summary) => Some(&summary.name),
            HotelRef::Id(_) => None,
        }
    }
}

/// Booking as returned by the remote Booking API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    #[serde(rename = "hotelId", alias = "hotel")]
    pub hotel: HotelRef,
    #[serde(default)]
    pub user_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(default, deserialize_with = "room_number_from_any", skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default = "default_guest_count")]
    pub guest_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_guest_count() -> u32 {
    1
}

/// Room numbers arrive as either JSON strings or numbers
fn room_number_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RoomNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RoomNumber>::deserialize(deserializer)?.map(|room| match room {
        RoomNumber::Text(text) => text,
        RoomNumber::Number(number) => number.to_string(),
    }))
}

/// Request body for creating a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_booking_dates"))]
pub struct NewBooking {
    #[validate(custom = "validate_not_blank")]
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[validate(range(min = 1, max = 20))]
    pub guest_count: u32,
    #[validate(length(max = 1000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// Request body for editing a booking; omitted fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_booking_dates"))]
pub struct UpdateBookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[validate(range(min = 1, max = 20))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    #[validate(length(max = 1000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// Request body for the admin confirm action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBookingRequest {
    #[validate(length(max = 5000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
}

/// Request body for the admin status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Booking annotated with the actions currently allowed on it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub can_cancel: bool,
    pub can_edit: bool,
    pub can_confirm: bool,
    pub nights: i64,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_form_is_upper_case() {
        assert_eq!(serde_json::to_string(&BookingStatus::Cancelled).unwrap(), "\"CANCELLED\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Refunded).unwrap(), "\"REFUNDED\"");
        let status: BookingStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, BookingStatus::Completed);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("confirmed".parse::<BookingStatus>(), Ok(BookingStatus::Confirmed));
        assert_eq!(" paid ".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert!("ALL".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_booking_with_populated_hotel() {
        let json = r#"{
            "_id": "b1",
            "bookingReference": "BK-1001",
            "hotelId": { "_id": "h1", "name": "Harbor House", "location": "Lisbon, Portugal" },
            "userId": "user_9",
            "checkIn": "2026-03-01T14:00:00.000Z",
            "checkOut": "2026-03-04T11:00:00.000Z",
            "roomNumber": 204,
            "totalPrice": 420,
            "status": "CONFIRMED",
            "paymentStatus": "PAID",
            "createdAt": "2026-02-01T10:00:00Z"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();

        assert_eq!(booking.hotel.id(), "h1");
        assert_eq!(booking.hotel.name(), Some("Harbor House"));
        assert_eq!(booking.room_number.as_deref(), Some("204"));
        assert_eq!(booking.guest_count, 1);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_booking_with_bare_hotel_id() {
        let json = r#"{
            "_id": "b2",
            "hotelId": "h7",
            "checkIn": "2026-03-01T14:00:00Z",
            "checkOut": "2026-03-02T11:00:00Z"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();

        assert_eq!(booking.hotel, HotelRef::Id("h7".to_string()));
        assert_eq!(booking.hotel.name(), None);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.created_at, None);
    }

    #[test]
    fn test_update_request_rejects_reversed_dates() {
        let request = UpdateBookingRequest {
            check_in: NaiveDate::from_ymd_opt(2026, 5, 10),
            check_out: NaiveDate::from_ymd_opt(2026, 5, 9),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_zero_guests() {
        let request = UpdateBookingRequest {
            guest_count: Some(0),
            ..Default::default()
        };
        assert!(request.validate().is_err());
        assert!(UpdateBookingRequest::default().validate().is_ok());
    }

    #[test]
    fn test_view_flattens_booking() {
        let now = Utc::now();
        let view = BookingView {
            booking: fixtures::booking("b1", now, 48),
            can_cancel: true,
            can_edit: true,
            can_confirm: true,
            nights: 2,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["_id"], "b1");
        assert_eq!(value["canCancel"], true);
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["nights"], 2);
    }
}
