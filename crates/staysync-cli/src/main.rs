use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use staysync_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Env;

#[derive(Parser)]
#[command(name = "staysync-cli", version, about = "Staysync CLI")]
struct Cli {
    /// Serve PMS data from a JSON fixture file instead of the live API
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,
    /// Database file (overrides database.path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a webhook body (read from stdin unless --file is given)
    Webhook {
        /// PMS vendor (defaults to pms.vendor)
        vendor: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Reconcile reservations checking in tomorrow
    Daily {
        /// PMS vendor (defaults to pms.vendor)
        vendor: Option<String>,
        /// Check-in date to reconcile instead of tomorrow (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Ask the PMS whether a stay includes breakfast
    Breakfast {
        vendor: String,
        hotel_id: String,
        reservation_id: String,
    },
    /// Hotel provisioning
    Hotel {
        #[command(subcommand)]
        action: commands::hotel::HotelAction,
    },
    /// List stored stays
    Stays {
        /// Only stays checking in on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List stored guests
    Guests,
    /// List registered PMS vendors
    Vendors,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.filter);

    let env = Env {
        config,
        fixtures: cli.fixtures,
        db: cli.db,
    };

    let result = match cli.command {
        Commands::Webhook { vendor, file } => {
            commands::webhook::run(&env, vendor.as_deref(), file.as_deref())
        }
        Commands::Daily { vendor, date } => commands::daily::run(&env, vendor.as_deref(), date),
        Commands::Breakfast {
            vendor,
            hotel_id,
            reservation_id,
        } => commands::breakfast::run(&env, &vendor, &hotel_id, &reservation_id),
        Commands::Hotel { action } => commands::hotel::run(&env, action),
        Commands::Stays { date } => commands::stays::run(&env, date),
        Commands::Guests => commands::guests::run(&env),
        Commands::Vendors => commands::vendors::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
