use chrono::NaiveDate;

use super::{print_json, CmdResult, Env};
use staysync_core::SyncContext;

/// Reconcile tomorrow's arrivals, or those of `date` when given.
pub fn run(env: &Env, vendor: Option<&str>, date: Option<NaiveDate>) -> CmdResult {
    let adapter = env.adapter(vendor)?;
    let db = env.open_db()?;
    let gateway = env.gateway()?;
    let ctx = SyncContext::new(&db, gateway.as_ref());

    let report = match date {
        Some(date) => adapter.update_stays_for_date(&ctx, date)?,
        None => adapter.update_tomorrows_stays(&ctx)?,
    };
    print_json(&report)
}
