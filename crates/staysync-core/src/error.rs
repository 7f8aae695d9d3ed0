//! Core error types for staysync-core.
//!
//! Each concern gets its own `thiserror` enum; [`CoreError`] wraps them for
//! callers that only need a single error type.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for staysync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Webhook body could not be deserialized
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Business rule violation on a guest or stay record
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Failure reaching or decoding the PMS
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Adapter lookup failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The raw webhook body is structurally unusable.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Not valid JSON, or a known field has the wrong shape
    #[error("malformed webhook body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but not an object
    #[error("webhook body must be a JSON object")]
    NotAnObject,
}

/// A guest or stay record broke a business invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing guest name")]
    MissingName,

    #[error("invalid phone number '{phone}'")]
    InvalidPhone { phone: String },

    #[error("phone number {phone} already belongs to another guest")]
    DuplicatePhone { phone: String },

    #[error("missing guest country")]
    MissingCountry,

    #[error("phone number {phone} used for multiple guests in one batch")]
    DuplicatePhoneInBatch { phone: String },

    #[error("invalid date for '{field}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("reservation belongs to hotel '{actual}', webhook was for '{expected}'")]
    HotelMismatch { expected: String, actual: String },
}

/// PMS gateway failures. All of them are per-event and retryable.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("PMS returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("PMS rejected credentials")]
    Unauthorized,

    #[error("PMS rate limit exceeded")]
    RateLimited,

    #[error("{kind} '{id}' not found at PMS")]
    NotFound { kind: &'static str, id: String },

    #[error("cannot decode PMS response: {0}")]
    Decode(String),

    #[error("PMS unavailable: {0}")]
    Unavailable(String),

    #[error("invalid PMS URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A uniqueness constraint rejected the write
    #[error("Uniqueness constraint violated: {0}")]
    Conflict(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Adapter registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no PMS adapter registered for '{name}'")]
    UnknownVendor { name: String },
}

/// Why a single event in a batch was skipped.
#[derive(Error, Debug)]
pub enum EventError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl EventError {
    /// Short machine-readable category for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            EventError::Validation(_) => "validation",
            EventError::Gateway(_) => "gateway",
            EventError::Database(_) => "database",
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => match e.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    DatabaseError::Locked
                }
                rusqlite::ErrorCode::ConstraintViolation
                    if matches!(
                        e.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    ) =>
                {
                    DatabaseError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()))
                }
                _ => DatabaseError::QueryFailed(err.to_string()),
            },
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for EventError {
    fn from(err: rusqlite::Error) -> Self {
        EventError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
