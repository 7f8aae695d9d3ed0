use super::{CmdResult, Env};

/// Prints `yes`, `no`, or `unknown`.
pub fn run(env: &Env, vendor: &str, hotel_id: &str, reservation_id: &str) -> CmdResult {
    let adapter = env.adapter(Some(vendor))?;
    let db = env.open_db()?;
    let stay = db
        .stay_by_reservation(hotel_id, reservation_id)?
        .ok_or_else(|| format!("no stay for reservation {reservation_id} at hotel {hotel_id}"))?;

    let gateway = env.gateway()?;
    let answer = match adapter.stay_has_breakfast(gateway.as_ref(), &stay)? {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    };
    println!("{answer}");
    Ok(())
}
