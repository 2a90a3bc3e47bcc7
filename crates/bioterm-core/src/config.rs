//! Terminal configuration.
//!
//! Configuration is read once at startup from a TOML file. Every key is
//! optional; missing keys take the defaults from [`crate::constants`].
//!
//! ```toml
//! admin_pin = "4821"
//!
//! [timing]
//! granted_dwell_ms = 2000
//! capture_timeout_ms = 0   # wait forever for a finger during enrollment
//!
//! [sensor]
//! port = "/dev/ttyUSB0"
//! baud = 57600
//! ```

use crate::{Error, Result, constants::*, types::AdminPin};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// PIN that unlocks the administrative menu.
    pub admin_pin: AdminPin,

    /// Dwell, hold and retry timings.
    pub timing: Timing,

    /// Character LCD geometry.
    pub display: DisplayConfig,

    /// Fingerprint module link settings.
    pub sensor: SensorConfig,
}

impl TerminalConfig {
    /// Parse a configuration from TOML text and validate it.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed TOML or an invalid PIN, and
    /// `Error::Config` when validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`TerminalConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.display.lines < DISPLAY_LINES {
            return Err(Error::Config(format!(
                "display needs at least {DISPLAY_LINES} lines, got {}",
                self.display.lines
            )));
        }
        if self.display.columns == 0 {
            return Err(Error::Config("display columns must be non-zero".to_string()));
        }
        if self.sensor.baud == 0 {
            return Err(Error::Config("sensor baud must be non-zero".to_string()));
        }
        if self.sensor.capacity < u16::from(MAX_SLOT_ID) {
            return Err(Error::Config(format!(
                "sensor capacity {} is smaller than the slot range",
                self.sensor.capacity
            )));
        }
        Ok(())
    }
}

/// Timings in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timing {
    pub granted_dwell_ms: u64,
    pub denied_dwell_ms: u64,
    pub error_hold_ms: u64,
    pub fail_pulse_ms: u64,
    pub lift_settle_ms: u64,
    pub retry_interval_ms: u64,
    pub result_hold_ms: u64,
    pub notice_hold_ms: u64,
    pub pin_ok_hold_ms: u64,
    pub boot_hold_ms: u64,
    pub idle_poll_ms: u64,
    /// Zero means enrollment waits are bounded only by keypad cancel.
    pub capture_timeout_ms: u64,
}

impl Timing {
    pub fn granted_dwell(&self) -> Duration {
        Duration::from_millis(self.granted_dwell_ms)
    }

    pub fn denied_dwell(&self) -> Duration {
        Duration::from_millis(self.denied_dwell_ms)
    }

    pub fn error_hold(&self) -> Duration {
        Duration::from_millis(self.error_hold_ms)
    }

    pub fn fail_pulse(&self) -> Duration {
        Duration::from_millis(self.fail_pulse_ms)
    }

    pub fn lift_settle(&self) -> Duration {
        Duration::from_millis(self.lift_settle_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn result_hold(&self) -> Duration {
        Duration::from_millis(self.result_hold_ms)
    }

    pub fn notice_hold(&self) -> Duration {
        Duration::from_millis(self.notice_hold_ms)
    }

    pub fn pin_ok_hold(&self) -> Duration {
        Duration::from_millis(self.pin_ok_hold_ms)
    }

    pub fn boot_hold(&self) -> Duration {
        Duration::from_millis(self.boot_hold_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    /// Bound for a single enrollment wait, `None` when unbounded.
    pub fn capture_timeout(&self) -> Option<Duration> {
        (self.capture_timeout_ms > 0).then(|| Duration::from_millis(self.capture_timeout_ms))
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            granted_dwell_ms: DEFAULT_GRANTED_DWELL_MS,
            denied_dwell_ms: DEFAULT_DENIED_DWELL_MS,
            error_hold_ms: DEFAULT_ERROR_HOLD_MS,
            fail_pulse_ms: DEFAULT_FAIL_PULSE_MS,
            lift_settle_ms: DEFAULT_LIFT_SETTLE_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            result_hold_ms: DEFAULT_RESULT_HOLD_MS,
            notice_hold_ms: DEFAULT_NOTICE_HOLD_MS,
            pin_ok_hold_ms: DEFAULT_PIN_OK_HOLD_MS,
            boot_hold_ms: DEFAULT_BOOT_HOLD_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            capture_timeout_ms: DEFAULT_CAPTURE_TIMEOUT_MS,
        }
    }
}

/// Character LCD geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub lines: usize,
    pub columns: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            lines: DISPLAY_LINES,
            columns: DISPLAY_COLUMNS,
        }
    }
}

/// Serial link to the fingerprint module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    /// Serial device path. `None` means the port must come from the command line.
    pub port: Option<String>,
    pub baud: u32,
    pub address: u32,
    pub password: u32,
    /// Number of template pages covered by a fast search.
    pub capacity: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_SENSOR_BAUD,
            address: DEFAULT_SENSOR_ADDRESS,
            password: DEFAULT_SENSOR_PASSWORD,
            capacity: DEFAULT_SENSOR_CAPACITY,
        }
    }
}
