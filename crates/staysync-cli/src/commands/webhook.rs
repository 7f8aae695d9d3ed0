//! Webhook ingress: one delivery in, one batch report out.

use std::io::Read;
use std::path::Path;

use super::{print_json, CmdResult, Env};
use staysync_core::SyncContext;

fn read_body(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

/// Per-event failures are reported, not fatal; only an unusable body or
/// unknown vendor fails the command.
pub fn run(env: &Env, vendor: Option<&str>, file: Option<&Path>) -> CmdResult {
    let adapter = env.adapter(vendor)?;
    let body = read_body(file)?;
    let payload = adapter.clean_webhook_payload(&body)?;

    let db = env.open_db()?;
    let gateway = env.gateway()?;
    let ctx = SyncContext::new(&db, gateway.as_ref());
    let report = adapter.handle_webhook(&ctx, &payload);

    print_json(&report)
}
