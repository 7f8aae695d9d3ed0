//! PMS gateway contract and wire records.
//!
//! The gateway is the only way adapters talk to the vendor. Calls block
//! from the caller's point of view and fail with [`GatewayError`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GatewayError;

/// Vendor IDs arrive as strings or bare numbers; anything else is dropped.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| id_from_value(&v)))
}

pub(crate) fn id_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reservation as reported by the PMS. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationDetails {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<String>,
}

/// Guest as reported by the PMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Live access to a vendor's PMS.
pub trait PmsGateway: Send + Sync {
    fn get_reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationDetails, GatewayError>;

    fn get_guest_details(&self, guest_id: &str) -> Result<GuestDetails, GatewayError>;

    /// Reservations whose check-in falls within `[checkin_start, checkin_end]`.
    fn get_reservations_for_date_range(
        &self,
        checkin_start: NaiveDateTime,
        checkin_end: NaiveDateTime,
    ) -> Result<Vec<ReservationDetails>, GatewayError>;

    /// `None` when the vendor does not know.
    fn get_breakfast_entitlement(&self, reservation_id: &str)
        -> Result<Option<bool>, GatewayError>;
}
