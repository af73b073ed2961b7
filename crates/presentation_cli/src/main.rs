//! TaxiFare CLI
//!
//! Operator interface for quoting, geocoding and tariff management. Works
//! in-process against the configured database and map providers.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::{Coordinate, QuoteRequest, TariffConfig, TariffTier};
use infrastructure::{
    AppConfig, LoggingConfig, Services, create_pool, init_logging, persistence::migrations,
};

/// TaxiFare CLI
#[derive(Parser, Debug)]
#[command(name = "taxifare-cli")]
#[command(author, version, about = "TaxiFare fare quoting CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config", env = "TAXIFARE_CONFIG")]
    config: String,

    /// SQLite database path, overrides the configuration
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Price a ride between two points
    ///
    /// Example: taxifare-cli quote --from 45.764,4.835 --to 45.188,5.724 --tier B
    Quote {
        /// Pickup as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Option<Coordinate>,

        /// Drop-off as LAT,LNG
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Option<Coordinate>,

        /// Known distance in km, skips estimation
        #[arg(long)]
        distance_km: Option<f64>,

        /// Known duration in minutes
        #[arg(long)]
        duration_minutes: Option<f64>,

        /// Tariff tier (A, B, C or D)
        #[arg(long, default_value = "A")]
        tier: TariffTier,

        /// Number of passengers
        #[arg(long, default_value = "1")]
        passengers: i64,

        /// Number of bags
        #[arg(long, default_value = "0")]
        baggage: i64,

        /// Waiting time in minutes
        #[arg(long, default_value = "0")]
        wait: i64,
    },

    /// Suggest addresses for free text
    Geocode {
        /// Address to look up
        address: String,
    },

    /// Show or change the tariff
    Tariff {
        #[command(subcommand)]
        action: TariffAction,
    },

    /// Re-price every published featured trip with the current tariff
    Refresh,

    /// Create or upgrade the database schema
    Migrate,
}

#[derive(Subcommand, Debug)]
enum TariffAction {
    /// Print the current tariff snapshot
    Show,

    /// Print previous snapshots, newest first
    History {
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Store a new tariff version; omitted values keep their current setting
    Set(TariffOverrides),
}

#[derive(clap::Args, Debug, Default, Clone, Copy)]
struct TariffOverrides {
    /// Pickup charge in cents
    #[arg(long)]
    base_cents: Option<u32>,
    /// Per-km price for tier A, in cents
    #[arg(long)]
    km_a_cents: Option<u32>,
    /// Per-km price for tier B, in cents
    #[arg(long)]
    km_b_cents: Option<u32>,
    /// Per-km price for tier C, in cents
    #[arg(long)]
    km_c_cents: Option<u32>,
    /// Per-km price for tier D, in cents
    #[arg(long)]
    km_d_cents: Option<u32>,
    /// Waiting price per hour, in cents
    #[arg(long)]
    wait_per_hour_cents: Option<u32>,
    /// Fee per bag, in cents
    #[arg(long)]
    baggage_cents: Option<u32>,
    /// Fifth passenger surcharge, in cents
    #[arg(long)]
    fifth_passenger_cents: Option<u32>,
}

impl TariffOverrides {
    fn apply(self, mut config: TariffConfig) -> TariffConfig {
        let set = |slot: &mut u32, value: Option<u32>| {
            if let Some(value) = value {
                *slot = value;
            }
        };
        set(&mut config.base_charge_cents, self.base_cents);
        set(&mut config.km_cents.a, self.km_a_cents);
        set(&mut config.km_cents.b, self.km_b_cents);
        set(&mut config.km_cents.c, self.km_c_cents);
        set(&mut config.km_cents.d, self.km_d_cents);
        set(&mut config.wait_per_hour_cents, self.wait_per_hour_cents);
        set(&mut config.baggage_fee_cents, self.baggage_cents);
        set(&mut config.fifth_passenger_cents, self.fifth_passenger_cents);
        config
    }
}

/// Parse `LAT,LNG`
fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{value}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    Coordinate::new(lat, lng).map_err(|e| e.to_string())
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn print_json(title: &str, value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{title}");
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from '{}'", cli.config))?;
    if let Some(path) = &cli.database {
        config.database.path = path.to_string_lossy().into_owned();
    }

    init_logging(&LoggingConfig {
        filter: log_filter_from_verbosity(cli.verbose).to_string(),
        format: config.logging.format,
    })?;

    if matches!(cli.command, Commands::Migrate) {
        config.database.run_migrations = true;
        let pool = create_pool(&config.database)?;
        let conn = pool.get()?;
        let version = migrations::schema_version(&conn)?;
        println!("🗄️  Database {} at schema version {version}", config.database.path);
        return Ok(());
    }

    let services = Services::build(&config)?;

    match cli.command {
        Commands::Quote {
            from,
            to,
            distance_km,
            duration_minutes,
            tier,
            passengers,
            baggage,
            wait,
        } => {
            let request = QuoteRequest {
                pickup: from,
                dropoff: to,
                distance_km,
                duration_minutes,
                tariff: tier,
                passengers,
                baggage_count: baggage,
                wait_minutes: wait,
                fifth_passenger: None,
            };
            let tariff = services.tariffs.current().await?;
            let quote = services.quotes.quote(&request, &tariff.config).await?;
            print_json("🚕 Quote:", &quote)?;
        },

        Commands::Geocode { address } => {
            let candidates = services.geocoding.geocode_internal(&address).await?;
            if candidates.is_empty() {
                println!("🔍 No address found for '{address}'");
            } else {
                print_json("📍 Suggestions:", &candidates)?;
            }
        },

        Commands::Tariff { action } => match action {
            TariffAction::Show => {
                print_json("💶 Current tariff:", &services.tariffs.current().await?)?;
            },
            TariffAction::History { limit } => {
                print_json("📜 Tariff history:", &services.tariffs.history(limit).await?)?;
            },
            TariffAction::Set(overrides) => {
                let current = services.tariffs.current().await?;
                let update = services
                    .tariffs
                    .update(overrides.apply(current.config))
                    .await?;
                print_json("✅ Tariff updated:", &update)?;
            },
        },

        Commands::Refresh => {
            let tariff = services.tariffs.current().await?;
            let report = services.refresher.refresh_all(&tariff.config).await?;
            print_json("🔄 Refresh report:", &report)?;
        },

        Commands::Migrate => {},
    }

    Ok(())
}
