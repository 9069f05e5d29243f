//! `porter-discover`: find the IP address of an ONVIF camera by its MAC.
//!
//! Exits with status 0 when a device with the MAC was found, 1 otherwise.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use porter_gateway::onvif::{self, DeviceOutcome, ScanOptions};

/// Find an ONVIF camera on the local network by MAC address.
#[derive(Debug, Parser)]
#[command(name = "porter-discover", version, about, long_about = None)]
struct Cli {
    /// MAC address to look for (`aa:bb:cc:dd:ee:ff` or `aa-bb-...`).
    #[arg(long)]
    mac: String,

    /// ONVIF user name.
    #[arg(long, default_value = "admin")]
    username: String,

    /// ONVIF password.
    #[arg(long, env = "ONVIF_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Device service port when the device does not advertise one.
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Seconds to wait for probe answers and for each device request.
    #[arg(long, default_value_t = 3)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ScanOptions {
        target_mac: cli.mac,
        username: cli.username,
        password: cli.password,
        port: cli.port,
        timeout: Duration::from_secs(cli.timeout_secs.max(1)),
    };

    let outcomes = onvif::scan(&options)
        .await
        .context("ONVIF discovery failed")?;

    if outcomes.is_empty() {
        println!("no ONVIF devices found");
        return Ok(ExitCode::FAILURE);
    }

    for outcome in &outcomes {
        match outcome {
            DeviceOutcome::Match { host, hw_address } => {
                println!("camera found: {hw_address} at {host}");
            }
            DeviceOutcome::NoMatch { host, hw_addresses } => {
                println!("{host}: no matching interface ({})", hw_addresses.join(", "));
            }
            DeviceOutcome::Failed { host, error } => {
                eprintln!("{host}: {error}");
            }
        }
    }

    if outcomes.iter().any(DeviceOutcome::is_match) {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no device with MAC {} found", options.target_mac);
        Ok(ExitCode::FAILURE)
    }
}
