//! Per-batch outcome: what was reconciled and what was skipped.

use serde::Serialize;

use super::reconciler::ReconciledEvent;
use crate::error::EventError;

/// Which path produced the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    Webhook,
    Daily,
}

/// An event that was skipped, with enough context to replay it.
#[derive(Debug, Serialize)]
pub struct EventFailure {
    pub reservation_id: String,
    pub hotel_id: Option<String>,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip)]
    pub error: EventError,
}

impl EventFailure {
    pub fn new(reservation_id: impl Into<String>, hotel_id: Option<String>, error: EventError) -> Self {
        Self {
            reservation_id: reservation_id.into(),
            hotel_id,
            kind: error.kind(),
            message: error.to_string(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub vendor: String,
    pub source: BatchSource,
    pub events_total: usize,
    pub reconciled: Vec<ReconciledEvent>,
    pub failures: Vec<EventFailure>,
}

impl BatchReport {
    pub fn new(vendor: impl Into<String>, source: BatchSource) -> Self {
        Self {
            vendor: vendor.into(),
            source,
            events_total: 0,
            reconciled: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True iff every event in the batch was reconciled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn guests_created(&self) -> usize {
        self.reconciled.iter().filter(|e| e.guest_created).count()
    }

    pub fn stays_created(&self) -> usize {
        self.reconciled.iter().filter(|e| e.stay_created).count()
    }

    pub fn stays_updated(&self) -> usize {
        self.reconciled.iter().filter(|e| !e.stay_created).count()
    }
}
