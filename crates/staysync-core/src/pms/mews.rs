//! Mews adapter.
//!
//! Mews webhooks look like:
//!
//! ```json
//! {
//!   "HotelId": "851df8c8-...",
//!   "IntegrationId": "c8bee838-...",
//!   "Events": [
//!     { "Name": "ReservationUpdated", "Value": { "ReservationId": "7c1f..." } }
//!   ]
//! }
//! ```
//!
//! Only the reservation ID is taken from each event; the rest is fetched
//! from the gateway.

use serde::Deserialize;
use serde_json::Value;

use super::gateway::{id_from_value, lenient_id};
use super::traits::{PmsAdapter, SyncContext};
use super::{WebhookEvent, WebhookPayload};
use crate::error::PayloadError;
use crate::reconcile::{BatchReport, BatchRun, BatchSource};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawWebhook {
    #[serde(default, deserialize_with = "lenient_id")]
    hotel_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    integration_id: Option<String>,
    #[serde(default)]
    events: Option<Vec<Value>>,
}

/// Pull `(Name, Value.ReservationId)` out of one raw event, if both exist.
fn clean_event(event: &Value) -> Option<WebhookEvent> {
    let name = event
        .get("Name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())?;
    let reservation_id = event
        .get("Value")
        .and_then(|v| v.get("ReservationId"))
        .and_then(id_from_value)?;
    Some(WebhookEvent {
        name: name.to_string(),
        reservation_id,
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PmsMews;

impl PmsAdapter for PmsMews {
    fn clean_webhook_payload(&self, raw: &str) -> Result<WebhookPayload, PayloadError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        let raw: RawWebhook = serde_json::from_value(value)?;

        let raw_events = raw.events.unwrap_or_default();
        let events: Vec<WebhookEvent> = raw_events.iter().filter_map(clean_event).collect();
        if events.len() < raw_events.len() {
            tracing::debug!(
                dropped = raw_events.len() - events.len(),
                "dropped incomplete webhook events"
            );
        }

        Ok(WebhookPayload {
            hotel_id: raw.hotel_id,
            integration_id: raw.integration_id,
            events,
        })
    }

    fn handle_webhook(&self, ctx: &SyncContext<'_>, payload: &WebhookPayload) -> BatchReport {
        let vendor = self.name();
        tracing::info!(
            vendor = %vendor,
            hotel_id = payload.hotel_id.as_deref().unwrap_or(""),
            integration_id = payload.integration_id.as_deref().unwrap_or(""),
            events = payload.events.len(),
            "handling webhook"
        );

        let mut run = BatchRun::new(&vendor, BatchSource::Webhook, ctx.db, ctx.gateway);
        for event in &payload.events {
            tracing::debug!(event = %event.name, reservation_id = %event.reservation_id, "webhook event");
            run.fetch_and_reconcile(&event.reservation_id, payload.hotel_id.as_deref());
        }
        run.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> Result<WebhookPayload, PayloadError> {
        PmsMews.clean_webhook_payload(raw)
    }

    #[test]
    fn name_is_derived_from_type() {
        assert_eq!(PmsMews.name(), "mews");
    }

    #[test]
    fn clean_keeps_complete_events() {
        let payload = clean(
            r#"{
                "HotelId": "H1",
                "IntegrationId": "I1",
                "Events": [
                    {"Name": "ReservationUpdated", "Value": {"ReservationId": "R1"}},
                    {"Name": "ReservationUpdated", "Value": {"ReservationId": "R2", "Extra": true}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.hotel_id.as_deref(), Some("H1"));
        assert_eq!(payload.integration_id.as_deref(), Some("I1"));
        let ids: Vec<_> = payload.events.iter().map(|e| e.reservation_id.as_str()).collect();
        assert_eq!(ids, ["R1", "R2"]);
    }

    #[test]
    fn clean_drops_incomplete_events() {
        let payload = clean(
            r#"{
                "HotelId": "H1",
                "Events": [
                    {"Name": "ReservationUpdated"},
                    {"Value": {"ReservationId": "R1"}},
                    {"Name": "", "Value": {"ReservationId": "R2"}},
                    {"Name": "ReservationUpdated", "Value": "R3"},
                    42,
                    {"Name": "ReservationUpdated", "Value": {"ReservationId": "R4"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.events.len(), 1);
        assert_eq!(payload.events[0].reservation_id, "R4");
    }

    #[test]
    fn clean_accepts_missing_events() {
        let payload = clean(r#"{"HotelId": 12}"#).unwrap();
        assert_eq!(payload.hotel_id.as_deref(), Some("12"));
        assert!(payload.events.is_empty());
        assert!(payload.integration_id.is_none());
    }

    #[test]
    fn clean_rejects_undecodable_bodies() {
        assert!(matches!(clean("{not json"), Err(PayloadError::Malformed(_))));
        assert!(matches!(clean("[1, 2]"), Err(PayloadError::NotAnObject)));
        assert!(matches!(clean("\"text\""), Err(PayloadError::NotAnObject)));
        assert!(matches!(
            clean(r#"{"Events": "R1"}"#),
            Err(PayloadError::Malformed(_))
        ));
    }
}
