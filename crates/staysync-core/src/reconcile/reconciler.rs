//! Idempotent guest and stay upserts.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DatabaseError, EventError, ValidationError};
use crate::mappings::{language_for_country, status_for_vendor};
use crate::models::{Guest, Stay, StayStatus};
use crate::pms::gateway::{GuestDetails, ReservationDetails};
use crate::storage::StayDb;
use crate::validation::{mask_phone, normalize_phone, validate_phone_number};

const VENDOR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted<T> {
    Created(T),
    /// Already stored; for stays the stored record has been updated.
    Matched(T),
}

impl<T> Upserted<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Upserted::Created(v) | Upserted::Matched(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(v) | Upserted::Matched(v) => v,
        }
    }
}

/// Phones of guests created so far in the current batch.
#[derive(Debug, Default, Clone)]
pub struct BatchContext {
    phones_seen: HashSet<String>,
}

impl BatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, phone: &str) -> bool {
        self.phones_seen.contains(phone)
    }

    fn record(&mut self, phone: &str) {
        self.phones_seen.insert(phone.to_string());
    }

    fn forget(&mut self, phone: &str) {
        self.phones_seen.remove(phone);
    }
}

/// What one successfully reconciled event did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledEvent {
    pub reservation_id: String,
    pub pms_hotel_id: String,
    pub guest_id: String,
    pub stay_id: String,
    pub guest_created: bool,
    pub stay_created: bool,
    pub status: StayStatus,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a vendor `YYYY-MM-DD` date.
pub fn parse_vendor_date(field: &str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let raw = non_empty(value).ok_or_else(|| ValidationError::MissingField {
        field: field.to_string(),
    })?;
    NaiveDate::parse_from_str(raw, VENDOR_DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Upserts guests and stays against a [`StayDb`].
pub struct Reconciler<'a> {
    db: &'a StayDb,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a StayDb) -> Self {
        Self { db }
    }

    /// Fetch the guest by phone or create it.
    ///
    /// An existing guest is returned unchanged, unless it was created earlier
    /// in this batch under a different name: one number cannot describe two
    /// guests.
    ///
    /// Not atomic on its own. Outside [`Reconciler::reconcile_event`] the
    /// caller owns the transaction; without one, a concurrent writer can
    /// store the phone between the lookup and the insert, in which case
    /// their guest is returned as `Matched`.
    pub fn upsert_guest(
        &self,
        details: &GuestDetails,
        batch: &mut BatchContext,
    ) -> Result<Upserted<Guest>, EventError> {
        let raw_phone = details.phone.as_deref().unwrap_or("").trim();
        let normalized = normalize_phone(raw_phone);
        let lookup_key = normalized.as_deref().unwrap_or(raw_phone);
        let name = non_empty(details.name.as_deref());

        if !lookup_key.is_empty() {
            if let Some(existing) = self.db.guest_by_phone(lookup_key)? {
                if batch.contains(&existing.phone) && name.is_some_and(|n| n != existing.name) {
                    return Err(ValidationError::DuplicatePhoneInBatch {
                        phone: existing.phone,
                    }
                    .into());
                }
                return Ok(Upserted::Matched(existing));
            }
        }

        let name = name.ok_or(ValidationError::MissingName)?;

        if !validate_phone_number(self.db, raw_phone)? {
            return Err(match normalized {
                Some(phone) => ValidationError::DuplicatePhone { phone },
                None => ValidationError::InvalidPhone {
                    phone: raw_phone.to_string(),
                },
            }
            .into());
        }
        // validate_phone_number only passes normalizable numbers
        let phone = normalized.ok_or_else(|| ValidationError::InvalidPhone {
            phone: raw_phone.to_string(),
        })?;

        let country = non_empty(details.country.as_deref()).ok_or(ValidationError::MissingCountry)?;

        if batch.contains(&phone) {
            return Err(ValidationError::DuplicatePhoneInBatch { phone }.into());
        }

        let language = language_for_country(country);
        if language.is_none() {
            tracing::debug!(country, "no language mapping for country");
        }

        let guest = self.insert_or_match_guest(Guest::new(phone, name, language))?;
        if let Upserted::Created(created) = &guest {
            batch.record(&created.phone);
            tracing::info!(
                guest_id = %created.id,
                phone = %mask_phone(&created.phone),
                "created guest"
            );
        }
        Ok(guest)
    }

    /// Insert `guest`; if another writer stored the phone first, return theirs.
    pub(super) fn insert_or_match_guest(&self, guest: Guest) -> Result<Upserted<Guest>, EventError> {
        match self.db.insert_guest(&guest) {
            Ok(()) => Ok(Upserted::Created(guest)),
            Err(DatabaseError::Conflict(msg)) => match self.db.guest_by_phone(&guest.phone)? {
                Some(existing) => Ok(Upserted::Matched(existing)),
                None => Err(DatabaseError::Conflict(msg).into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Update the stay for this reservation in place, or create it.
    ///
    /// `fallback_hotel_id` scopes the reservation when the PMS record has no
    /// `HotelId` of its own.
    ///
    /// Not atomic on its own; see [`Reconciler::upsert_guest`]. A stay
    /// created concurrently after the lookup is updated in place.
    pub fn upsert_stay(
        &self,
        details: &ReservationDetails,
        fallback_hotel_id: Option<&str>,
        guest: &Guest,
    ) -> Result<Upserted<Stay>, EventError> {
        let reservation_id = non_empty(details.reservation_id.as_deref()).ok_or_else(|| {
            ValidationError::MissingField {
                field: "ReservationId".to_string(),
            }
        })?;
        let pms_hotel_id = non_empty(details.hotel_id.as_deref())
            .or_else(|| non_empty(fallback_hotel_id))
            .ok_or_else(|| ValidationError::MissingField {
                field: "HotelId".to_string(),
            })?;
        let status = status_for_vendor(details.status.as_deref().unwrap_or("").trim());
        let checkin = parse_vendor_date("CheckInDate", details.check_in_date.as_deref())?;
        let checkout = parse_vendor_date("CheckOutDate", details.check_out_date.as_deref())?;
        let pms_guest_id = non_empty(details.guest_id.as_deref()).map(str::to_string);

        if let Some(stay) = self.db.stay_by_reservation(pms_hotel_id, reservation_id)? {
            let stay = self.apply_update(stay, guest, pms_guest_id, status, checkin, checkout)?;
            return Ok(Upserted::Matched(stay));
        }

        let hotel = self.db.hotel_by_pms_id(pms_hotel_id)?;
        if hotel.is_none() {
            tracing::warn!(
                hotel_id = pms_hotel_id,
                reservation_id,
                "hotel not provisioned, creating stay without hotel reference"
            );
        }

        let now = Utc::now();
        let stay = Stay {
            id: Uuid::new_v4().to_string(),
            pms_hotel_id: pms_hotel_id.to_string(),
            hotel_id: hotel.map(|h| h.id),
            guest_id: guest.id.clone(),
            pms_reservation_id: reservation_id.to_string(),
            pms_guest_id,
            status,
            checkin,
            checkout,
            created_at: now,
            updated_at: now,
        };

        let stay = self.insert_or_update_stay(stay, guest)?;
        if let Upserted::Created(created) = &stay {
            tracing::info!(
                stay_id = %created.id,
                hotel_id = pms_hotel_id,
                reservation_id,
                status = created.status.as_str(),
                "created stay"
            );
        }
        Ok(stay)
    }

    /// Insert `stay`; if another writer created the reservation first,
    /// apply `stay`'s state to theirs instead.
    pub(super) fn insert_or_update_stay(
        &self,
        stay: Stay,
        guest: &Guest,
    ) -> Result<Upserted<Stay>, EventError> {
        match self.db.insert_stay(&stay) {
            Ok(()) => Ok(Upserted::Created(stay)),
            Err(DatabaseError::Conflict(msg)) => {
                let existing = self
                    .db
                    .stay_by_reservation(&stay.pms_hotel_id, &stay.pms_reservation_id)?
                    .ok_or(DatabaseError::Conflict(msg))?;
                let updated = self.apply_update(
                    existing,
                    guest,
                    stay.pms_guest_id,
                    stay.status,
                    stay.checkin,
                    stay.checkout,
                )?;
                Ok(Upserted::Matched(updated))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Last write wins. Backward status moves are applied but logged.
    fn apply_update(
        &self,
        mut stay: Stay,
        guest: &Guest,
        pms_guest_id: Option<String>,
        status: StayStatus,
        checkin: NaiveDate,
        checkout: NaiveDate,
    ) -> Result<Stay, EventError> {
        if stay.status.is_regression_to(status) {
            tracing::warn!(
                reservation_id = %stay.pms_reservation_id,
                hotel_id = %stay.pms_hotel_id,
                from = stay.status.as_str(),
                to = status.as_str(),
                "stay status moved backward"
            );
        }

        stay.guest_id = guest.id.clone();
        if pms_guest_id.is_some() {
            stay.pms_guest_id = pms_guest_id;
        }
        stay.status = status;
        stay.checkin = checkin;
        stay.checkout = checkout;
        if stay.hotel_id.is_none() {
            stay.hotel_id = self.db.hotel_by_pms_id(&stay.pms_hotel_id)?.map(|h| h.id);
        }
        stay.updated_at = Utc::now();

        self.db.update_stay(&stay)?;
        tracing::debug!(
            stay_id = %stay.id,
            reservation_id = %stay.pms_reservation_id,
            status = stay.status.as_str(),
            "updated stay"
        );
        Ok(stay)
    }

    /// Upsert guest and stay for one event atomically.
    ///
    /// Either both writes land or neither does. `expected_hotel_id` is the
    /// hotel the event was delivered for, if any; a reservation reporting a
    /// different hotel is rejected.
    pub fn reconcile_event(
        &self,
        reservation: &ReservationDetails,
        guest_details: &GuestDetails,
        expected_hotel_id: Option<&str>,
        batch: &mut BatchContext,
    ) -> Result<ReconciledEvent, EventError> {
        let expected = non_empty(expected_hotel_id);
        if let (Some(expected), Some(actual)) = (expected, non_empty(reservation.hotel_id.as_deref()))
        {
            if expected != actual {
                return Err(ValidationError::HotelMismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                }
                .into());
            }
        }

        let mut created_phone: Option<String> = None;
        let result = self.db.transaction(|_| {
            let guest = self.upsert_guest(guest_details, batch)?;
            if guest.was_created() {
                created_phone = Some(guest.get().phone.clone());
            }
            let stay = self.upsert_stay(reservation, expected, guest.get())?;

            let guest_created = guest.was_created();
            let stay_created = stay.was_created();
            let guest = guest.into_inner();
            let stay = stay.into_inner();
            Ok::<_, EventError>(ReconciledEvent {
                reservation_id: stay.pms_reservation_id,
                pms_hotel_id: stay.pms_hotel_id,
                guest_id: guest.id,
                stay_id: stay.id,
                guest_created,
                stay_created,
                status: stay.status,
            })
        });

        if result.is_err() {
            // The guest insert was rolled back with the rest of the event.
            if let Some(phone) = created_phone {
                batch.forget(&phone);
            }
        }
        result
    }
}
