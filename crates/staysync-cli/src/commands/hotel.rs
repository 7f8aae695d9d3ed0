use clap::Subcommand;
use staysync_core::Hotel;

use super::{print_json, CmdResult, Env};

#[derive(Subcommand)]
pub enum HotelAction {
    /// Provision a hotel
    Add {
        /// The hotel's ID at the PMS
        pms_hotel_id: String,
        name: String,
    },
    /// List provisioned hotels
    List,
}

pub fn run(env: &Env, action: HotelAction) -> CmdResult {
    let db = env.open_db()?;
    match action {
        HotelAction::Add { pms_hotel_id, name } => {
            let hotel = Hotel::new(pms_hotel_id, name);
            db.insert_hotel(&hotel)?;
            println!("Hotel added: {} ({})", hotel.name, hotel.pms_hotel_id);
        }
        HotelAction::List => {
            print_json(&db.list_hotels()?)?;
        }
    }
    Ok(())
}
