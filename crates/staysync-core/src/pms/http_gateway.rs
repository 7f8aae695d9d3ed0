//! Gateway backed by the PMS REST API.
//!
//! Requests run on a runtime owned by the gateway, so every call blocks
//! from the caller's point of view.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Runtime;
use url::Url;

use super::gateway::{GuestDetails, PmsGateway, ReservationDetails};
use crate::error::GatewayError;
use crate::storage::GatewayConfig;

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct HttpGateway {
    base_url: Url,
    api_key: Option<String>,
    client: Client,
    runtime: Runtime,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Unavailable(format!(
                "'{base_url}' cannot be used as a base URL"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("cannot start runtime: {e}")))?;

        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
            runtime,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(&config.base_url, Some(config.resolved_api_key()), config.timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in new(): the base URL always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url`; `Ok(None)` on 404.
    fn get(&self, url: Url) -> Result<Option<Value>, GatewayError> {
        tracing::debug!(path = url.path(), "PMS request");
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        self.runtime.block_on(send(request))
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        url: Url,
        kind: &'static str,
        id: &str,
    ) -> Result<T, GatewayError> {
        let value = self.get(url)?.ok_or_else(|| GatewayError::NotFound {
            kind,
            id: id.to_string(),
        })?;
        decode(value)
    }
}

async fn send(request: RequestBuilder) -> Result<Option<Value>, GatewayError> {
    let response = request.send().await?;
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => return Ok(None),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(GatewayError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => return Err(GatewayError::RateLimited),
        _ => {}
    }
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::Http {
            status: status.as_u16(),
            body,
        });
    }
    parse_body(&body).map(Some)
}

/// The mock PMS sometimes wraps its JSON document in a JSON string.
fn parse_body(body: &str) -> Result<Value, GatewayError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| GatewayError::Decode(e.to_string()))
        }
        other => Ok(other),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// `true`/`false`, `{"HasBreakfast": bool}`, or anything else as unknown.
fn breakfast_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Object(map) => map.get("HasBreakfast").and_then(Value::as_bool),
        _ => None,
    }
}

impl PmsGateway for HttpGateway {
    fn get_reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationDetails, GatewayError> {
        let url = self.endpoint(&["reservations", reservation_id]);
        self.get_record(url, "reservation", reservation_id)
    }

    fn get_guest_details(&self, guest_id: &str) -> Result<GuestDetails, GatewayError> {
        let url = self.endpoint(&["guests", guest_id]);
        self.get_record(url, "guest", guest_id)
    }

    fn get_reservations_for_date_range(
        &self,
        checkin_start: NaiveDateTime,
        checkin_end: NaiveDateTime,
    ) -> Result<Vec<ReservationDetails>, GatewayError> {
        let mut url = self.endpoint(&["reservations"]);
        url.query_pairs_mut()
            .append_pair(
                "checkin_start",
                &checkin_start.format(QUERY_TIME_FORMAT).to_string(),
            )
            .append_pair(
                "checkin_end",
                &checkin_end.format(QUERY_TIME_FORMAT).to_string(),
            );
        match self.get(url)? {
            Some(value) => decode(value),
            None => Ok(Vec::new()),
        }
    }

    fn get_breakfast_entitlement(
        &self,
        reservation_id: &str,
    ) -> Result<Option<bool>, GatewayError> {
        let url = self.endpoint(&["reservations", reservation_id, "breakfast"]);
        Ok(self.get(url)?.as_ref().and_then(breakfast_flag))
    }
}
