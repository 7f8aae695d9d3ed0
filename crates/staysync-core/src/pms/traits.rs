use chrono::{Days, Local, NaiveDate, NaiveTime};

use super::gateway::PmsGateway;
use super::WebhookPayload;
use crate::error::{GatewayError, PayloadError};
use crate::models::Stay;
use crate::reconcile::{BatchReport, BatchRun, BatchSource};
use crate::storage::StayDb;

/// What an adapter needs to reconcile a batch.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub db: &'a StayDb,
    pub gateway: &'a dyn PmsGateway,
}

impl<'a> SyncContext<'a> {
    pub fn new(db: &'a StayDb, gateway: &'a dyn PmsGateway) -> Self {
        Self { db, gateway }
    }
}

/// `my_crate::pms::PmsMews` -> `mews`.
pub fn adapter_name(type_name: &str) -> String {
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    short.strip_prefix("Pms").unwrap_or(short).to_lowercase()
}

/// Every PMS vendor implements this trait.
/// Adapters are stateless; storage and the PMS connection arrive through
/// [`SyncContext`].
pub trait PmsAdapter: Send + Sync {
    /// Registry key, derived from the type name unless overridden.
    fn name(&self) -> String {
        adapter_name(std::any::type_name::<Self>())
    }

    /// Parse a raw webhook body into the vendor-agnostic shape.
    ///
    /// Incomplete events are dropped; only an undecodable body is an error.
    fn clean_webhook_payload(&self, raw: &str) -> Result<WebhookPayload, PayloadError>;

    /// Reconcile every event of a cleaned payload, in order.
    fn handle_webhook(&self, ctx: &SyncContext<'_>, payload: &WebhookPayload) -> BatchReport;

    /// Reconcile all reservations checking in tomorrow (local calendar).
    fn update_tomorrows_stays(&self, ctx: &SyncContext<'_>) -> Result<BatchReport, GatewayError> {
        let today = Local::now().date_naive();
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| GatewayError::Unavailable(format!("no day after {today}")))?;
        self.update_stays_for_date(ctx, tomorrow)
    }

    /// Reconcile all reservations checking in on `date`.
    ///
    /// Fails only when the reservation list itself cannot be fetched.
    fn update_stays_for_date(
        &self,
        ctx: &SyncContext<'_>,
        date: NaiveDate,
    ) -> Result<BatchReport, GatewayError> {
        let start = date.and_time(NaiveTime::MIN);
        let end = date.and_hms_opt(23, 59, 59).unwrap_or(start);
        let reservations = ctx.gateway.get_reservations_for_date_range(start, end)?;
        tracing::info!(
            vendor = %self.name(),
            %date,
            count = reservations.len(),
            "fetched reservations checking in"
        );

        let vendor = self.name();
        let mut run = BatchRun::new(&vendor, BatchSource::Daily, ctx.db, ctx.gateway);
        for reservation in &reservations {
            run.reconcile_reservation(reservation);
        }
        Ok(run.finish())
    }

    /// Live breakfast lookup for a stay. Never touches storage.
    fn stay_has_breakfast(
        &self,
        gateway: &dyn PmsGateway,
        stay: &Stay,
    ) -> Result<Option<bool>, GatewayError> {
        gateway.get_breakfast_entitlement(&stay.pms_reservation_id)
    }
}
