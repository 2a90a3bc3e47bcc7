//! Biometric access terminal controller.
//!
//! This crate contains the session state machine, the sensor protocols
//! (verify, enroll, delete) and the polling loop that ties a fingerprint
//! sensor, a keypad, a two-line display and pass/fail indicators together.
//! A successful match is announced to the host as a `LOGIN:<id>` line.

pub mod buffer;
pub mod controller;
pub mod display;
pub mod error;
pub mod host;
pub mod mode;
pub mod protocol;
pub mod session;

pub use buffer::DigitBuffer;
pub use controller::{Controller, Lifecycle, Peripherals};
pub use display::{Frame, VirtualDisplay, pad_text, truncate_text};
pub use error::{ControllerError, Result};
pub use host::{HostChannel, LineHost, RecordingHost};
pub use mode::{Mode, ModeTracker, ModeTransition};
pub use protocol::{EnrollError, EnrollReport, EnrollStep, MatchResult};
pub use session::{Action, Session};
