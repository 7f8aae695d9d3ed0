//! Guest phone number validation.
//!
//! Numbers are normalized to a rough E.164 form: `+` followed by 7 to 15
//! digits, the first of which (the country code) is non-zero. Full
//! numbering-plan validation is not attempted.

use crate::error::DatabaseError;
use crate::storage::StayDb;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Normalize a vendor phone string to E.164, or `None` if it cannot be one.
///
/// Spaces, dashes, dots and parentheses are dropped and a leading `00`
/// international prefix becomes `+`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '\u{a0}'))
        .collect();

    let digits = if let Some(rest) = compact.strip_prefix('+') {
        rest
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest
    } else {
        return None;
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return None;
    }
    if digits.starts_with('0') {
        return None;
    }

    Some(format!("+{digits}"))
}

/// True if the number can be normalized to E.164.
pub fn is_valid_phone_number(phone: &str) -> bool {
    normalize_phone(phone).is_some()
}

/// True if no stored guest uses this (normalized) number.
pub fn is_unique_phone_number(db: &StayDb, phone: &str) -> Result<bool, DatabaseError> {
    match normalize_phone(phone) {
        Some(normalized) => Ok(!db.phone_exists(&normalized)?),
        None => Ok(!db.phone_exists(phone)?),
    }
}

/// Valid format and not yet in the store.
pub fn validate_phone_number(db: &StayDb, phone: &str) -> Result<bool, DatabaseError> {
    Ok(is_valid_phone_number(phone) && is_unique_phone_number(db, phone)?)
}

/// Last four digits only, for log output.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("***{tail}")
}
