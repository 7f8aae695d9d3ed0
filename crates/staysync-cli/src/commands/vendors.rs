use staysync_core::pms::registry;

use super::CmdResult;

pub fn run() -> CmdResult {
    for vendor in registry::vendors() {
        println!("{vendor}");
    }
    Ok(())
}
