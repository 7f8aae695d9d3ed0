//! End-to-end webhook handling: raw body -> adapter -> gateway -> store.
//!
//! Uses the in-memory fixture gateway and an in-memory database, so no
//! network or filesystem access is needed.

use staysync_core::error::{EventError, GatewayError, ValidationError};
use staysync_core::models::{Hotel, Language, StayStatus};
use staysync_core::pms::registry;
use staysync_core::pms::{FixtureGateway, GuestDetails, ReservationDetails, SyncContext};
use staysync_core::storage::StayDb;

// ============================================================================
// Test Helpers
// ============================================================================

fn reservation(id: &str, guest_id: &str, status: &str) -> ReservationDetails {
    ReservationDetails {
        reservation_id: Some(id.to_string()),
        guest_id: Some(guest_id.to_string()),
        hotel_id: Some("H1".to_string()),
        status: Some(status.to_string()),
        check_in_date: Some("2024-03-15".to_string()),
        check_out_date: Some("2024-03-17".to_string()),
    }
}

fn guest(name: &str, phone: &str, country: &str) -> GuestDetails {
    GuestDetails {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        country: Some(country.to_string()),
    }
}

fn webhook(hotel_id: &str, reservation_ids: &[&str]) -> String {
    let events: Vec<_> = reservation_ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "Name": "ReservationUpdated",
                "Value": { "ReservationId": id }
            })
        })
        .collect();
    serde_json::json!({
        "HotelId": hotel_id,
        "IntegrationId": "integration-1",
        "Events": events,
    })
    .to_string()
}

fn jansen_gateway() -> FixtureGateway {
    FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", "booked"))
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_webhook_creates_guest_and_stay() {
    let db = StayDb::open_memory().unwrap();
    db.insert_hotel(&Hotel::new("H1", "Hotel One")).unwrap();
    let gateway = jansen_gateway();
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter.clean_webhook_payload(&webhook("H1", &["R1"])).unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert!(report.is_success());
    assert_eq!(report.events_total, 1);
    assert_eq!(report.guests_created(), 1);
    assert_eq!(report.stays_created(), 1);

    let stored = db.guest_by_phone("+31612345678").unwrap().unwrap();
    assert_eq!(stored.language, Some(Language::Dutch));
    let stay = db.stay_by_reservation("H1", "R1").unwrap().unwrap();
    assert_eq!(stay.status, StayStatus::Before);
    assert!(stay.hotel_id.is_some());
}

#[test]
fn test_webhook_redelivery_is_idempotent() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway();
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();
    let payload = adapter.clean_webhook_payload(&webhook("H1", &["R1"])).unwrap();

    let first = adapter.handle_webhook(&ctx, &payload);
    let snapshot = (db.list_guests().unwrap(), db.list_stays().unwrap());
    let second = adapter.handle_webhook(&ctx, &payload);

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(second.guests_created(), 0);
    assert_eq!(second.stays_created(), 0);

    let (guests, stays) = (db.list_guests().unwrap(), db.list_stays().unwrap());
    assert_eq!(guests.len(), snapshot.0.len());
    assert_eq!(stays.len(), snapshot.1.len());
    assert_eq!(stays[0].id, snapshot.1[0].id);
    assert_eq!(stays[0].status, snapshot.1[0].status);
    assert_eq!(guests[0].name, snapshot.0[0].name);
}

#[test]
fn test_partial_batch_keeps_good_events() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway()
        .with_reservation(reservation("R2", "G2", "booked"))
        .with_guest("G2", guest("No Phone", "12", "DE"))
        .with_reservation(reservation("R3", "G3", "in_house"))
        .with_guest("G3", guest("B. Schmidt", "+4915112345678", "DE"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter
        .clean_webhook_payload(&webhook("H1", &["R1", "R2", "R3"]))
        .unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert!(!report.is_success());
    assert_eq!(report.events_total, 3);
    assert_eq!(report.reconciled.len(), 2);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.reservation_id, "R2");
    assert_eq!(failure.hotel_id.as_deref(), Some("H1"));
    assert!(matches!(
        failure.error,
        EventError::Validation(ValidationError::InvalidPhone { .. })
    ));

    assert!(db.stay_by_reservation("H1", "R2").unwrap().is_none());
    assert_eq!(db.count_guests().unwrap(), 2);
    assert_eq!(db.count_stays().unwrap(), 2);
}

#[test]
fn test_gateway_failure_is_per_event() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway()
        .with_reservation(reservation("R2", "G1", "booked"))
        .failing("R2");
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter
        .clean_webhook_payload(&webhook("H1", &["R2", "R1", "R404"]))
        .unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert_eq!(report.reconciled.len(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[0].error,
        EventError::Gateway(GatewayError::Unavailable(_))
    ));
    assert!(matches!(
        report.failures[1].error,
        EventError::Gateway(GatewayError::NotFound { .. })
    ));
    assert_eq!(report.failures[1].kind, "gateway");
    assert!(db.stay_by_reservation("H1", "R1").unwrap().is_some());
}

#[test]
fn test_same_phone_two_names_in_one_webhook() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway()
        .with_reservation(reservation("R2", "G2", "booked"))
        .with_guest("G2", guest("B. de Vries", "+31 6 12345678", "NL"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter
        .clean_webhook_payload(&webhook("H1", &["R1", "R2"]))
        .unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert_eq!(report.reconciled.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        EventError::Validation(ValidationError::DuplicatePhoneInBatch { .. })
    ));
    let stored = db.guest_by_phone("+31612345678").unwrap().unwrap();
    assert_eq!(stored.name, "A. Jansen");
}

#[test]
fn test_reservation_for_other_hotel_is_rejected() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway();
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter.clean_webhook_payload(&webhook("H2", &["R1"])).unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert!(!report.is_success());
    assert!(matches!(
        report.failures[0].error,
        EventError::Validation(ValidationError::HotelMismatch { .. })
    ));
    assert_eq!(db.count_stays().unwrap(), 0);
}

#[test]
fn test_incomplete_events_are_skipped_silently() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway();
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let raw = r#"{
        "HotelId": "H1",
        "Events": [
            {"Name": "ReservationUpdated", "Value": {}},
            {"Name": "ReservationUpdated", "Value": {"ReservationId": "R1"}}
        ]
    }"#;
    let payload = adapter.clean_webhook_payload(raw).unwrap();
    let report = adapter.handle_webhook(&ctx, &payload);

    assert_eq!(report.events_total, 1);
    assert!(report.is_success());
}

#[test]
fn test_breakfast_is_live_and_may_be_unknown() {
    let db = StayDb::open_memory().unwrap();
    let gateway = jansen_gateway()
        .with_reservation(reservation("R2", "G1", "booked"))
        .with_breakfast("R1", true);
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter
        .clean_webhook_payload(&webhook("H1", &["R1", "R2"]))
        .unwrap();
    assert!(adapter.handle_webhook(&ctx, &payload).is_success());

    let with = db.stay_by_reservation("H1", "R1").unwrap().unwrap();
    let without = db.stay_by_reservation("H1", "R2").unwrap().unwrap();
    assert_eq!(adapter.stay_has_breakfast(&gateway, &with).unwrap(), Some(true));
    assert_eq!(adapter.stay_has_breakfast(&gateway, &without).unwrap(), None);
}
