//! Canonical local data model: hotels, guests and stays.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guest language preference. Derived from the guest's country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    Dutch,
    German,
    BritishEnglish,
    PortuguesePortugal,
    French,
    Spanish,
    Italian,
}

impl Language {
    /// Language code as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Dutch => "nl",
            Language::German => "de",
            Language::BritishEnglish => "en-GB",
            Language::PortuguesePortugal => "pt-PT",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Italian => "it",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "nl" => Some(Language::Dutch),
            "de" => Some(Language::German),
            "en-GB" => Some(Language::BritishEnglish),
            "pt-PT" => Some(Language::PortuguesePortugal),
            "fr" => Some(Language::French),
            "es" => Some(Language::Spanish),
            "it" => Some(Language::Italian),
            _ => None,
        }
    }
}

/// Canonical stay status. Vendor strings never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StayStatus {
    Before,
    Instay,
    After,
    Cancel,
    Unknown,
}

impl StayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StayStatus::Before => "BEFORE",
            StayStatus::Instay => "INSTAY",
            StayStatus::After => "AFTER",
            StayStatus::Cancel => "CANCEL",
            StayStatus::Unknown => "UNKNOWN",
        }
    }

    /// Parse a stored status. Anything unrecognised reads back as `Unknown`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "BEFORE" => StayStatus::Before,
            "INSTAY" => StayStatus::Instay,
            "AFTER" => StayStatus::After,
            "CANCEL" => StayStatus::Cancel,
            _ => StayStatus::Unknown,
        }
    }

    /// Position along the arrival timeline; cancel/unknown are off the timeline.
    fn timeline_position(&self) -> Option<u8> {
        match self {
            StayStatus::Before => Some(0),
            StayStatus::Instay => Some(1),
            StayStatus::After => Some(2),
            StayStatus::Cancel | StayStatus::Unknown => None,
        }
    }

    /// True when moving from `self` to `next` goes backward in time
    /// (e.g. a stale "booked" arriving after "checked_out").
    pub fn is_regression_to(&self, next: StayStatus) -> bool {
        match (self.timeline_position(), next.timeline_position()) {
            (Some(current), Some(next)) => next < current,
            _ => false,
        }
    }
}

/// A pre-provisioned hotel, looked up by its vendor ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub pms_hotel_id: String,
    pub name: String,
}

impl Hotel {
    pub fn new(pms_hotel_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pms_hotel_id: pms_hotel_id.into(),
            name: name.into(),
        }
    }
}

/// A guest, identified by an E.164-normalized phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub language: Option<Language>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    pub fn new(phone: impl Into<String>, name: impl Into<String>, language: Option<Language>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            phone: phone.into(),
            name: name.into(),
            language,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reservation, unique per (vendor hotel ID, vendor reservation ID).
///
/// `hotel_id` is the local hotel reference and stays `None` until the
/// hotel is provisioned; `pms_hotel_id` always scopes the reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub id: String,
    pub pms_hotel_id: String,
    pub hotel_id: Option<String>,
    pub guest_id: String,
    pub pms_reservation_id: String,
    pub pms_guest_id: Option<String>,
    pub status: StayStatus,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
