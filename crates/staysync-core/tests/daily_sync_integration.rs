//! Daily pull of next-day arrivals through the adapter.

use chrono::{Days, Local, NaiveDate};
use staysync_core::error::{EventError, ValidationError};
use staysync_core::models::StayStatus;
use staysync_core::pms::registry;
use staysync_core::pms::{FixtureGateway, GuestDetails, ReservationDetails, SyncContext};
use staysync_core::reconcile::BatchSource;
use staysync_core::storage::StayDb;

fn reservation(id: &str, guest_id: &str, checkin: &str, checkout: &str) -> ReservationDetails {
    ReservationDetails {
        reservation_id: Some(id.to_string()),
        guest_id: Some(guest_id.to_string()),
        hotel_id: Some("H1".to_string()),
        status: Some("booked".to_string()),
        check_in_date: Some(checkin.to_string()),
        check_out_date: Some(checkout.to_string()),
    }
}

fn guest(name: &str, phone: &str, country: &str) -> GuestDetails {
    GuestDetails {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        country: Some(country.to_string()),
    }
}

fn day(d: &str) -> NaiveDate {
    NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
}

#[test]
fn test_update_stays_for_date_only_touches_that_day() {
    let db = StayDb::open_memory().unwrap();
    let gateway = FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", "2024-03-15", "2024-03-17"))
        .with_reservation(reservation("R2", "G2", "2024-03-16", "2024-03-18"))
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"))
        .with_guest("G2", guest("C. Smith", "+447700900123", "GB"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let report = adapter.update_stays_for_date(&ctx, day("2024-03-15")).unwrap();

    assert_eq!(report.source, BatchSource::Daily);
    assert!(report.is_success());
    assert_eq!(report.events_total, 1);
    assert!(db.stay_by_reservation("H1", "R1").unwrap().is_some());
    assert!(db.stay_by_reservation("H1", "R2").unwrap().is_none());

    let arriving = db.stays_checking_in(day("2024-03-15")).unwrap();
    assert_eq!(arriving.len(), 1);
    assert_eq!(arriving[0].pms_reservation_id, "R1");
}

#[test]
fn test_daily_run_is_idempotent() {
    let db = StayDb::open_memory().unwrap();
    let gateway = FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", "2024-03-15", "2024-03-17"))
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    adapter.update_stays_for_date(&ctx, day("2024-03-15")).unwrap();
    let report = adapter.update_stays_for_date(&ctx, day("2024-03-15")).unwrap();

    assert!(report.is_success());
    assert_eq!(report.stays_created(), 0);
    assert_eq!(report.stays_updated(), 1);
    assert_eq!(db.count_guests().unwrap(), 1);
    assert_eq!(db.count_stays().unwrap(), 1);
}

#[test]
fn test_daily_run_updates_webhook_created_stay() {
    let db = StayDb::open_memory().unwrap();
    let booked = FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", "2024-03-15", "2024-03-17"))
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"));
    let adapter = registry::resolve("mews").unwrap();

    let payload = adapter
        .clean_webhook_payload(
            r#"{"HotelId": "H1", "Events": [{"Name": "ReservationUpdated", "Value": {"ReservationId": "R1"}}]}"#,
        )
        .unwrap();
    assert!(adapter
        .handle_webhook(&SyncContext::new(&db, &booked), &payload)
        .is_success());

    let mut moved = reservation("R1", "G1", "2024-03-15", "2024-03-19");
    moved.status = Some("in_house".to_string());
    let later = FixtureGateway::new()
        .with_reservation(moved)
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"));
    let report = adapter
        .update_stays_for_date(&SyncContext::new(&db, &later), day("2024-03-15"))
        .unwrap();

    assert_eq!(report.stays_updated(), 1);
    let stay = db.stay_by_reservation("H1", "R1").unwrap().unwrap();
    assert_eq!(stay.status, StayStatus::Instay);
    assert_eq!(stay.checkout, day("2024-03-19"));
    assert_eq!(db.count_stays().unwrap(), 1);
}

#[test]
fn test_daily_run_reports_incomplete_records() {
    let db = StayDb::open_memory().unwrap();
    let mut no_guest = reservation("R2", "G2", "2024-03-15", "2024-03-16");
    no_guest.guest_id = None;
    let gateway = FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", "2024-03-15", "2024-03-17"))
        .with_reservation(no_guest)
        .with_guest("G1", guest("", "+31612345678", "NL"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let report = adapter.update_stays_for_date(&ctx, day("2024-03-15")).unwrap();

    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[0].error,
        EventError::Validation(ValidationError::MissingName)
    ));
    assert!(matches!(
        report.failures[1].error,
        EventError::Validation(ValidationError::MissingField { .. })
    ));
    assert_eq!(db.count_guests().unwrap(), 0);
}

#[test]
fn test_update_tomorrows_stays_uses_local_tomorrow() {
    let tomorrow = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap();
    let after = tomorrow.checked_add_days(Days::new(2)).unwrap();
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

    let db = StayDb::open_memory().unwrap();
    let gateway = FixtureGateway::new()
        .with_reservation(reservation("R1", "G1", &fmt(tomorrow), &fmt(after)))
        .with_reservation(reservation("R2", "G1", &fmt(after), &fmt(after)))
        .with_guest("G1", guest("A. Jansen", "+31612345678", "NL"));
    let ctx = SyncContext::new(&db, &gateway);
    let adapter = registry::resolve("mews").unwrap();

    let report = adapter.update_tomorrows_stays(&ctx).unwrap();

    assert!(report.is_success());
    assert_eq!(report.events_total, 1);
    assert_eq!(db.stays_checking_in(tomorrow).unwrap().len(), 1);
}
