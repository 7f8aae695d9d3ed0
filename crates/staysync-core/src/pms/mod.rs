//! PMS vendor adapters, the gateways they talk through, and the registry
//! that maps vendor names to adapters.

pub mod fixture_gateway;
pub mod gateway;
pub mod http_gateway;
pub mod mews;
pub mod registry;
pub mod traits;

use serde::Serialize;

pub use fixture_gateway::FixtureGateway;
pub use gateway::{GuestDetails, PmsGateway, ReservationDetails};
pub use http_gateway::HttpGateway;
pub use mews::PmsMews;
pub use traits::{PmsAdapter, SyncContext};

/// One event of a cleaned webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookEvent {
    pub name: String,
    pub reservation_id: String,
}

/// Vendor-agnostic webhook shape produced by
/// [`PmsAdapter::clean_webhook_payload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub hotel_id: Option<String>,
    pub integration_id: Option<String>,
    pub events: Vec<WebhookEvent>,
}
