use chrono::NaiveDate;

use super::{print_json, CmdResult, Env};

pub fn run(env: &Env, date: Option<NaiveDate>) -> CmdResult {
    let db = env.open_db()?;
    let stays = match date {
        Some(date) => db.stays_checking_in(date)?,
        None => db.list_stays()?,
    };
    print_json(&stays)
}
