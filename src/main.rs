//! inflight - query in-flight Wi-Fi portal services from the command line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inflight_portal::models::{WeatherRequest, WeatherUnit};
use inflight_portal::{Config, PortalClient};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inflight")]
#[command(about = "In-flight Wi-Fi portal client", long_about = None)]
struct Args {
    /// Config file path (default: search config.toml locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL (e.g. the manufacturer's emulator)
    #[arg(long)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the on-board API is reachable
    Probe,
    /// Walk through every endpoint, like the portal front-end does
    Smoke,
    /// Manufacturer configuration
    Manufacturer,
    /// Live flight information
    Flight,
    /// Portal front-end configuration
    Portal,
    /// What the provisioning service knows about this device
    Device {
        /// Provisioning service base URL
        provisioning_service: String,
    },
    /// Wi-Fi inventory of the flight
    Inventory,
    /// API version
    Version,
    /// Register this device and print its token
    Register,
    /// Internet provision for a device token
    Provision { device_token: String },
    /// Airport information by IATA code
    Airport { iata: String },
    /// Weather at the destination
    Weather {
        #[arg(long = "language", default_values_t = ["en-GB".to_string()])]
        languages: Vec<String>,
        #[arg(long = "service", default_values_t = ["currentconditions".to_string(), "forecast5days".to_string()])]
        services: Vec<String>,
        #[arg(long, value_enum, default_value_t = Unit::Metric)]
        unit: Unit,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Unit {
    Metric,
    Imperial,
}

impl From<Unit> for WeatherUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Metric => WeatherUnit::Metric,
            Unit::Imperial => WeatherUnit::Imperial,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut cfg = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(api_base) = args.api_base {
        cfg.endpoints.api_base_url = api_base;
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = PortalClient::new(&cfg).context("Failed to create HTTP client")?;

    match args.command {
        Command::Probe => {
            let in_flight = client.is_in_flight().await;
            tracing::info!("In flight: {}", in_flight);
            println!("{in_flight}");
        }
        Command::Smoke => run_smoke(&client).await?,
        Command::Manufacturer => print_json(&client.get_manufacturer_config().await?)?,
        Command::Flight => print_json(&client.get_flight_information().await?)?,
        Command::Portal => print_json(&client.get_portal_config().await?)?,
        Command::Device {
            provisioning_service,
        } => print_json(&client.get_device_info(&provisioning_service).await?)?,
        Command::Inventory => print_json(&client.get_wifi_inventory().await?)?,
        Command::Version => print_json(&client.get_api_version().await?)?,
        Command::Register => print_json(&client.register_device().await?)?,
        Command::Provision { device_token } => {
            print_json(&client.get_internet_provision(&device_token).await?)?
        }
        Command::Airport { iata } => print_json(&client.get_airport_information(&iata).await?)?,
        Command::Weather {
            languages,
            services,
            unit,
        } => {
            let request = WeatherRequest {
                languages,
                services,
                unit: unit.into(),
            };
            print_json(&client.get_weather(&request).await?)?
        }
        Command::Config => print!("{}", cfg.to_toml()?),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_labeled<T: Serialize>(label: &str, value: Option<&T>) -> Result<()> {
    match value {
        Some(v) => println!("{label}: {}", serde_json::to_string_pretty(v)?),
        None => println!("{label}: null"),
    }
    Ok(())
}

/// Call every endpoint in the order the portal front-end does
async fn run_smoke(client: &PortalClient) -> Result<()> {
    let manufacturer = client
        .get_manufacturer_config()
        .await
        .context("Manufacturer config")?;
    print_labeled("Manufacturer config", Some(&manufacturer))?;

    let emulator = match manufacturer.emulator.as_deref() {
        Some(url) => Some(
            client
                .with_api_base(url)
                .with_context(|| format!("Bad emulator URL: {url}"))?,
        ),
        None => {
            tracing::warn!("Manufacturer config has no emulator URL, skipping API calls");
            None
        }
    };

    let flight = match &emulator {
        Some(api) => Some(api.get_flight_information().await.context("Flight information")?),
        None => None,
    };
    print_labeled("Flight information", flight.as_ref())?;

    let portal = client.get_portal_config().await.context("Portal config")?;
    print_labeled("Portal config", Some(&portal))?;

    let device = match manufacturer.provisioning_service.as_deref() {
        Some(url) => Some(client.get_device_info(url).await.context("Device info")?),
        None => None,
    };
    print_labeled("Device info", device.as_ref())?;

    let Some(api) = emulator else {
        return Ok(());
    };

    let inventory = api.get_wifi_inventory().await.context("Wi-Fi inventory")?;
    print_labeled("Wi-Fi inventory", Some(&inventory))?;

    let version = api.get_api_version().await.context("API version")?;
    print_labeled("API version", Some(&version))?;

    let registration = api.register_device().await.context("Device registration")?;
    let device_token = registration
        .device_token
        .unwrap_or_else(|| "null".to_string());

    let provision = api
        .get_internet_provision(&device_token)
        .await
        .context("Internet provision")?;
    print_labeled("Internet provision", Some(&provision))?;

    let flight = flight.unwrap_or_default();
    for (label, iata) in [
        ("Origin airport information", flight.origin_iata.as_deref()),
        ("Destination airport information", flight.destination_iata.as_deref()),
    ] {
        let airport = match iata {
            Some(code) => Some(
                api.get_airport_information(code)
                    .await
                    .with_context(|| format!("Airport information for {code}"))?,
            ),
            None => None,
        };
        print_labeled(label, airport.as_ref())?;
    }

    Ok(())
}
