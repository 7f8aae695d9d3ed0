pub mod breakfast;
pub mod config;
pub mod daily;
pub mod guests;
pub mod hotel;
pub mod stays;
pub mod vendors;
pub mod webhook;

use std::error::Error;
use std::path::PathBuf;

use staysync_core::pms::registry;
use staysync_core::{Config, FixtureGateway, HttpGateway, PmsAdapter, PmsGateway, StayDb};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Settings shared by every command.
pub struct Env {
    pub config: Config,
    pub fixtures: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

impl Env {
    /// `--db`, then `database.path`, then the data directory.
    pub fn open_db(&self) -> Result<StayDb, Box<dyn Error>> {
        let explicit = self.db.as_ref().or(self.config.database.path.as_ref());
        let db = match explicit {
            Some(path) => {
                tracing::debug!(path = %path.display(), "opening database");
                StayDb::open(path)?
            }
            None => {
                tracing::debug!("opening default database");
                StayDb::open_default()?
            }
        };
        Ok(db)
    }

    /// Fixture gateway when `--fixtures` is set, the HTTP gateway otherwise.
    pub fn gateway(&self) -> Result<Box<dyn PmsGateway>, Box<dyn Error>> {
        match &self.fixtures {
            Some(path) => {
                tracing::debug!(fixtures = %path.display(), "using fixture gateway");
                Ok(Box::new(FixtureGateway::from_path(path)?))
            }
            None => {
                tracing::debug!(base_url = %self.config.gateway.base_url, "using HTTP gateway");
                Ok(Box::new(HttpGateway::from_config(&self.config.gateway)?))
            }
        }
    }

    pub fn adapter(&self, vendor: Option<&str>) -> Result<Box<dyn PmsAdapter>, Box<dyn Error>> {
        let name = vendor.unwrap_or(&self.config.pms.vendor);
        let adapter = registry::require(name)?;
        tracing::debug!(vendor = %adapter.name(), "resolved PMS adapter");
        Ok(adapter)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
