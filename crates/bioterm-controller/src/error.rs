//! Controller error types.
//!
//! Sensor codes produced inside a protocol step never stop the polling
//! cycle: the protocols report them on the display and in the log, then
//! return to the admin menu. They surface here only as the outcome of a
//! direct [`Controller::enroll`](crate::Controller::enroll) or
//! [`Controller::delete`](crate::Controller::delete) call.

use bioterm_core::SlotId;
use bioterm_hardware::HardwareError;
use thiserror::Error;

use crate::controller::Lifecycle;
use crate::protocol::EnrollError;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The sensor handshake failed at boot. The terminal is halted for good.
    #[error("Fingerprint sensor unavailable: {0}")]
    SensorUnavailable(#[source] HardwareError),

    /// The input source can no longer deliver keys.
    #[error("Input source closed: {0}")]
    InputClosed(#[source] HardwareError),

    /// The operation needs a running terminal.
    #[error("Terminal is not running (lifecycle: {0})")]
    NotRunning(Lifecycle),

    /// The host notification could not be delivered.
    #[error("Host channel failed: {0}")]
    Host(#[from] std::io::Error),

    /// An enrollment stopped before the template was stored.
    #[error(transparent)]
    Enrollment(#[from] EnrollError),

    /// The template store refused a deletion.
    #[error("Deleting ID {slot} failed: {source}")]
    Deletion {
        slot: SlotId,
        #[source]
        source: HardwareError,
    },

    /// Domain invariant violated.
    #[error(transparent)]
    Core(#[from] bioterm_core::Error),
}

impl ControllerError {
    /// Whether the terminal can never run again after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SensorUnavailable(_) | Self::NotRunning(crate::controller::Lifecycle::Halted)
        )
    }
}
