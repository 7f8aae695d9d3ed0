//! Per-event loop shared by the webhook and daily paths.

use super::reconciler::{BatchContext, Reconciler};
use super::report::{BatchReport, BatchSource, EventFailure};
use crate::error::EventError;
use crate::pms::gateway::{PmsGateway, ReservationDetails};
use crate::storage::StayDb;

/// Runs events one at a time, turning each failure into a report entry
/// instead of aborting the batch.
pub struct BatchRun<'a> {
    reconciler: Reconciler<'a>,
    gateway: &'a dyn PmsGateway,
    context: BatchContext,
    report: BatchReport,
}

impl<'a> BatchRun<'a> {
    pub fn new(
        vendor: &str,
        source: BatchSource,
        db: &'a StayDb,
        gateway: &'a dyn PmsGateway,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(db),
            gateway,
            context: BatchContext::new(),
            report: BatchReport::new(vendor, source),
        }
    }

    /// Fetch the reservation by ID, then reconcile it.
    pub fn fetch_and_reconcile(&mut self, reservation_id: &str, hotel_id: Option<&str>) {
        self.report.events_total += 1;
        let result = self
            .gateway
            .get_reservation_details(reservation_id)
            .map_err(EventError::from)
            .and_then(|details| self.reconcile(&details, hotel_id));
        self.record(reservation_id, hotel_id, result);
    }

    /// Reconcile a reservation record already fetched from the PMS.
    pub fn reconcile_reservation(&mut self, reservation: &ReservationDetails) {
        self.report.events_total += 1;
        let reservation_id = reservation.reservation_id.clone().unwrap_or_default();
        let hotel_id = reservation.hotel_id.clone();
        let result = self.reconcile(reservation, None);
        self.record(&reservation_id, hotel_id.as_deref(), result);
    }

    fn reconcile(
        &mut self,
        reservation: &ReservationDetails,
        hotel_id: Option<&str>,
    ) -> Result<super::ReconciledEvent, EventError> {
        let guest_id = reservation
            .guest_id
            .as_deref()
            .ok_or_else(|| crate::error::ValidationError::MissingField {
                field: "GuestId".to_string(),
            })?;
        let guest = self.gateway.get_guest_details(guest_id)?;
        self.reconciler
            .reconcile_event(reservation, &guest, hotel_id, &mut self.context)
    }

    fn record(
        &mut self,
        reservation_id: &str,
        hotel_id: Option<&str>,
        result: Result<super::ReconciledEvent, EventError>,
    ) {
        match result {
            Ok(event) => {
                tracing::debug!(
                    vendor = %self.report.vendor,
                    reservation_id,
                    hotel_id = %event.pms_hotel_id,
                    stay_created = event.stay_created,
                    "event reconciled"
                );
                self.report.reconciled.push(event);
            }
            Err(error) => {
                tracing::warn!(
                    vendor = %self.report.vendor,
                    reservation_id,
                    hotel_id = hotel_id.unwrap_or(""),
                    kind = error.kind(),
                    error = %error,
                    "event skipped"
                );
                self.report.failures.push(EventFailure::new(
                    reservation_id,
                    hotel_id.map(str::to_string),
                    error,
                ));
            }
        }
    }

    pub fn finish(self) -> BatchReport {
        let report = self.report;
        tracing::info!(
            vendor = %report.vendor,
            source = ?report.source,
            total = report.events_total,
            reconciled = report.reconciled.len(),
            failed = report.failures.len(),
            "batch finished"
        );
        report
    }
}
