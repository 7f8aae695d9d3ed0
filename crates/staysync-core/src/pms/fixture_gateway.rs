//! In-memory gateway for offline runs and tests.
//!
//! Fixture documents look like:
//!
//! ```json
//! {
//!   "reservations": [
//!     {"ReservationId": "R1", "GuestId": "G1", "HotelId": "H1",
//!      "Status": "booked", "CheckInDate": "2024-03-15", "CheckOutDate": "2024-03-17"}
//!   ],
//!   "guests": {"G1": {"Name": "A. Jansen", "Phone": "+31612345678", "Country": "NL"}},
//!   "breakfast": {"R1": true}
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::gateway::{GuestDetails, PmsGateway, ReservationDetails};
use crate::error::{CoreError, GatewayError};

#[derive(Debug, Default, Deserialize)]
struct FixtureDocument {
    #[serde(default)]
    reservations: Vec<ReservationDetails>,
    #[serde(default)]
    guests: HashMap<String, GuestDetails>,
    #[serde(default)]
    breakfast: HashMap<String, bool>,
}

#[derive(Debug, Default, Clone)]
pub struct FixtureGateway {
    reservations: Vec<ReservationDetails>,
    guests: HashMap<String, GuestDetails>,
    breakfast: HashMap<String, bool>,
    failing: HashSet<String>,
}

impl FixtureGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let doc: FixtureDocument = serde_json::from_str(json)?;
        Ok(Self {
            reservations: doc.reservations,
            guests: doc.guests,
            breakfast: doc.breakfast,
            failing: HashSet::new(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }

    pub fn with_reservation(mut self, reservation: ReservationDetails) -> Self {
        self.reservations.push(reservation);
        self
    }

    pub fn with_guest(mut self, guest_id: &str, guest: GuestDetails) -> Self {
        self.guests.insert(guest_id.to_string(), guest);
        self
    }

    pub fn with_breakfast(mut self, reservation_id: &str, included: bool) -> Self {
        self.breakfast.insert(reservation_id.to_string(), included);
        self
    }

    /// Every call keyed by `id` (reservation or guest) fails as unavailable.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    fn check(&self, id: &str) -> Result<(), GatewayError> {
        if self.failing.contains(id) {
            return Err(GatewayError::Unavailable(format!("fixture failure for '{id}'")));
        }
        Ok(())
    }
}

fn checkin(reservation: &ReservationDetails) -> Option<NaiveDate> {
    reservation
        .check_in_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
}

impl PmsGateway for FixtureGateway {
    fn get_reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationDetails, GatewayError> {
        self.check(reservation_id)?;
        self.reservations
            .iter()
            .find(|r| r.reservation_id.as_deref() == Some(reservation_id))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                kind: "reservation",
                id: reservation_id.to_string(),
            })
    }

    fn get_guest_details(&self, guest_id: &str) -> Result<GuestDetails, GatewayError> {
        self.check(guest_id)?;
        self.guests
            .get(guest_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                kind: "guest",
                id: guest_id.to_string(),
            })
    }

    fn get_reservations_for_date_range(
        &self,
        checkin_start: NaiveDateTime,
        checkin_end: NaiveDateTime,
    ) -> Result<Vec<ReservationDetails>, GatewayError> {
        let (start, end) = (checkin_start.date(), checkin_end.date());
        Ok(self
            .reservations
            .iter()
            .filter(|r| checkin(r).is_some_and(|d| d >= start && d <= end))
            .cloned()
            .collect())
    }

    fn get_breakfast_entitlement(
        &self,
        reservation_id: &str,
    ) -> Result<Option<bool>, GatewayError> {
        self.check(reservation_id)?;
        Ok(self.breakfast.get(reservation_id).copied())
    }
}
