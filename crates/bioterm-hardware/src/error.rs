//! Error types for hardware operations.
//!
//! Sensor confirmation codes other than OK surface as
//! [`HardwareError::Sensor`]; transport-level failures use the remaining
//! variants.

use crate::types::SensorCode;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The sensor answered with a non-OK confirmation code.
    #[error("Sensor reported {0}")]
    Sensor(SensorCode),

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// The sensor confirmation code, if this error carries one.
    pub fn sensor_code(&self) -> Option<SensorCode> {
        match self {
            Self::Sensor(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the sensor simply saw no finger. This is noise, not a failure.
    pub fn is_no_finger(&self) -> bool {
        matches!(self, Self::Sensor(SensorCode::NoFinger))
    }
}

impl From<SensorCode> for HardwareError {
    fn from(code: SensorCode) -> Self {
        Self::Sensor(code)
    }
}
