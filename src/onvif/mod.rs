//! One-shot ONVIF camera discovery.
//!
//! [`scan`] multicasts a WS-Discovery probe, asks every responding device
//! for its network interfaces and reports which one carries the wanted MAC
//! address. Used by the `porter-discover` binary.

pub mod device;
pub mod probe;

use std::time::Duration;

pub use device::{DeviceClient, UsernameToken, mac_matches};
pub use probe::{DiscoveredDevice, discover};

/// Errors raised while discovering or querying ONVIF devices.
#[derive(Debug, thiserror::Error)]
pub enum OnvifError {
    /// Socket failure during discovery.
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
    /// Advertised device address is not a usable URL.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),
    /// Malformed XML from a device.
    #[error("invalid xml: {0}")]
    Xml(String),
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The device answered with a SOAP fault or an error status.
    #[error("device fault: {0}")]
    Fault(String),
}

/// Parameters of one discovery run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// MAC address to look for.
    pub target_mac: String,
    /// ONVIF user name.
    pub username: String,
    /// ONVIF password.
    pub password: String,
    /// Device service port used when the advertised address carries none.
    pub port: u16,
    /// How long to collect probe answers, also used as the per-device
    /// request timeout.
    pub timeout: Duration,
}

/// What happened with one discovered device.
#[derive(Debug)]
pub enum DeviceOutcome {
    /// An interface carries the target MAC.
    Match {
        /// Device host.
        host: String,
        /// Hardware address as reported by the device.
        hw_address: String,
    },
    /// Interfaces were read but none matched.
    NoMatch {
        /// Device host.
        host: String,
        /// Hardware addresses reported by the device.
        hw_addresses: Vec<String>,
    },
    /// The device could not be queried.
    Failed {
        /// Device host.
        host: String,
        /// Why the query failed.
        error: OnvifError,
    },
}

impl DeviceOutcome {
    /// Whether this device carries the target MAC.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Discovers devices and checks each one for the target MAC. A failing
/// device is reported as [`DeviceOutcome::Failed`] and does not stop the
/// scan.
///
/// # Errors
///
/// Returns [`OnvifError::Io`] if the probe cannot be sent, or
/// [`OnvifError::Http`] if the HTTP client cannot be built.
pub async fn scan(options: &ScanOptions) -> Result<Vec<DeviceOutcome>, OnvifError> {
    let devices = discover(options.timeout).await?;
    tracing::info!(count = devices.len(), "ONVIF probe finished");

    let client = DeviceClient::new(&options.username, &options.password, options.timeout)?;
    let mut outcomes = Vec::with_capacity(devices.len());
    for device in devices {
        let port = device.port.unwrap_or(options.port);
        let outcome = match client.network_interfaces(&device.host, port).await {
            Ok(hw_addresses) => {
                match hw_addresses
                    .iter()
                    .find(|hw| mac_matches(hw, &options.target_mac))
                {
                    Some(hw) => DeviceOutcome::Match {
                        host: device.host,
                        hw_address: hw.clone(),
                    },
                    None => DeviceOutcome::NoMatch {
                        host: device.host,
                        hw_addresses,
                    },
                }
            }
            Err(error) => {
                tracing::warn!(host = %device.host, %error, "device query failed");
                DeviceOutcome::Failed {
                    host: device.host,
                    error,
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
