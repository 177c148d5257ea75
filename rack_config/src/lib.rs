#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rack motion workflow.
//!
//! The original example compiled its serial number, channel, position and
//! velocity in as constants; here they live in a validated TOML config with
//! the same values as defaults. CLI flags may override individual fields.
use serde::Deserialize;

/// Target device identity.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Device {
    /// Serial number of the rack module to drive (matched on the first
    /// 8 characters during enumeration).
    pub serial: String,
    /// Motor channel on the rack, 1-based.
    pub channel: u16,
    /// Vendor module type code used as the enumeration filter.
    pub module_type: u32,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            serial: "50837825".to_string(),
            channel: 1,
            module_type: 50,
        }
    }
}

/// Motion sequence parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Motion {
    /// Target position in device units.
    pub position: i32,
    /// Max velocity to apply before the move; 0 leaves the device setting
    /// untouched.
    pub velocity: i32,
    /// Delay between starting polling and homing (ms).
    pub settle_ms: u64,
    /// Upper bound on each completion wait (ms); 0 waits forever.
    pub wait_timeout_ms: u64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            position: 0,
            velocity: 0,
            settle_ms: 3_000,
            wait_timeout_ms: 0,
        }
    }
}

/// Driver status-polling cadence.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Polling {
    pub interval_ms: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Self { interval_ms: 200 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub motion: Motion,
    pub polling: Polling,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is a separate step so callers
/// can apply CLI overrides in between.
pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config {}: {e}", path.display()))?;
    load_toml(&content).map_err(|e| eyre::eyre!("failed to parse config {}: {e}", path.display()))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.device.serial.trim().is_empty() {
            eyre::bail!("device.serial must not be empty");
        }
        if !self.device.serial.chars().all(|c| c.is_ascii_digit()) {
            eyre::bail!("device.serial must be numeric, got {:?}", self.device.serial);
        }
        if self.device.channel == 0 {
            eyre::bail!("device.channel is 1-based and must be >= 1");
        }
        if self.motion.velocity < 0 {
            eyre::bail!("motion.velocity must be >= 0 (0 keeps the device setting)");
        }
        if self.polling.interval_ms == 0 {
            eyre::bail!("polling.interval_ms must be >= 1");
        }
        if let Some(rot) = &self.logging.rotation {
            match rot.as_str() {
                "never" | "daily" | "hourly" => {}
                other => eyre::bail!(
                    "logging.rotation must be one of never|daily|hourly, got {other:?}"
                ),
            }
        }
        Ok(())
    }
}
