//! Reconciliation engine: turns PMS records into guest and stay upserts.

pub mod batch;
pub mod reconciler;
pub mod report;


pub use batch::BatchRun;
pub use reconciler::{parse_vendor_date, BatchContext, ReconciledEvent, Reconciler, Upserted};
pub use report::{BatchReport, BatchSource, EventFailure};
