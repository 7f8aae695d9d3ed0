//! Vendor → canonical lookup tables.
//!
//! Both tables are built once on first use and only exposed through lookup
//! functions, so nothing can mutate them after initialization.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{Language, StayStatus};

/// Country (ISO 3166-1 alpha-2) → guest language.
/// Country is not language: several countries share one entry.
static LANGUAGE_BY_COUNTRY: LazyLock<HashMap<&'static str, Language>> = LazyLock::new(|| {
    HashMap::from([
        ("NL", Language::Dutch),
        ("BE", Language::Dutch),
        ("DE", Language::German),
        ("AT", Language::German),
        ("CH", Language::German),
        ("GB", Language::BritishEnglish),
        ("GG", Language::BritishEnglish),
        ("IE", Language::BritishEnglish),
        ("CA", Language::BritishEnglish),
        ("AU", Language::BritishEnglish),
        ("NZ", Language::BritishEnglish),
        ("US", Language::BritishEnglish),
        ("CN", Language::BritishEnglish),
        ("BR", Language::PortuguesePortugal),
        ("PT", Language::PortuguesePortugal),
        ("FR", Language::French),
        ("ES", Language::Spanish),
        ("IT", Language::Italian),
    ])
});

/// Vendor reservation status → canonical status.
static STATUS_BY_VENDOR: LazyLock<HashMap<&'static str, StayStatus>> = LazyLock::new(|| {
    HashMap::from([
        ("booked", StayStatus::Before),
        ("in_house", StayStatus::Instay),
        ("checked_out", StayStatus::After),
        ("cancelled", StayStatus::Cancel),
        // Lossy on purpose: neither maps onto the canonical timeline.
        ("no_show", StayStatus::Unknown),
        ("not_confirmed", StayStatus::Unknown),
    ])
});

/// Language for a country code, `None` when the country is not in the table.
pub fn language_for_country(country: &str) -> Option<Language> {
    let code = country.trim().to_ascii_uppercase();
    LANGUAGE_BY_COUNTRY.get(code.as_str()).copied()
}

/// Canonical status for a vendor status string; unmapped strings are `Unknown`.
pub fn status_for_vendor(status: &str) -> StayStatus {
    STATUS_BY_VENDOR
        .get(status)
        .copied()
        .unwrap_or(StayStatus::Unknown)
}

/// Vendor status strings with an explicit mapping.
pub fn known_vendor_statuses() -> impl Iterator<Item = (&'static str, StayStatus)> {
    STATUS_BY_VENDOR.iter().map(|(k, v)| (*k, *v))
}
