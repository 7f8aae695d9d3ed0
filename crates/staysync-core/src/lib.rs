//! # Staysync Core Library
//!
//! Keeps a hotel's local guest and stay records in step with the property
//! management system (PMS) the hotel runs. Vendors push change notifications
//! as webhooks; a daily job pulls tomorrow's arrivals. Both paths end in the
//! same idempotent reconciliation, so replays are always safe.
//!
//! ## Architecture
//!
//! - **Adapters**: one [`PmsAdapter`] per vendor, looked up by name in the
//!   [`registry`](pms::registry)
//! - **Gateways**: the live PMS connection behind [`PmsGateway`], over HTTP
//!   or from an in-memory fixture
//! - **Reconciliation**: guest and stay upserts, atomic per event, with a
//!   [`BatchReport`] per delivery
//! - **Storage**: SQLite record store and TOML configuration
//!
//! ## Key Components
//!
//! - [`Reconciler`]: Guest and stay upserts
//! - [`StayDb`]: Hotel, guest and stay persistence
//! - [`Config`]: Application configuration management
//! - [`PmsAdapter`]: Trait for PMS vendors

pub mod error;
pub mod mappings;
pub mod models;
pub mod pms;
pub mod reconcile;
pub mod storage;
pub mod validation;

pub use error::{
    ConfigError, CoreError, DatabaseError, EventError, GatewayError, PayloadError, RegistryError,
    ValidationError,
};
pub use models::{Guest, Hotel, Language, Stay, StayStatus};
pub use pms::{
    FixtureGateway, GuestDetails, HttpGateway, PmsAdapter, PmsGateway, ReservationDetails,
    SyncContext, WebhookEvent, WebhookPayload,
};
pub use reconcile::{BatchReport, BatchSource, EventFailure, ReconciledEvent, Reconciler};
pub use storage::{Config, StayDb};
