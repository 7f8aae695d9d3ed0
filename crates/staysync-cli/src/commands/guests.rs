use super::{print_json, CmdResult, Env};

pub fn run(env: &Env) -> CmdResult {
    let db = env.open_db()?;
    print_json(&db.list_guests()?)
}
