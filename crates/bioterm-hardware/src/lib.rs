//! Hardware abstraction layer for the biometric access terminal.
//!
//! This crate defines the collaborators the terminal controller talks to and
//! nothing about how the controller uses them:
//!
//! - [`SensorLink`]: a fingerprint module with an on-board template library,
//!   addressed by slot id.
//! - [`InputSource`]: key presses from the 4×4 keypad.
//! - [`DisplaySink`]: a two-line character display.
//! - [`IndicatorOutput`]: green/red LEDs and the buzzer.
//!
//! # Design Philosophy
//!
//! - **Async where it waits**: sensor commands and waiting for a key are
//!   `async fn` (Rust 1.90 + Edition 2024 RPITIT), so a wait for a finger can
//!   be raced against a cancel key.
//! - **Generic, not dynamic**: the traits are used through type parameters.
//! - **Error-aware**: sensor confirmation codes surface as
//!   [`HardwareError::Sensor`] carrying a [`SensorCode`].
//!
//! # Example
//!
//! ```no_run
//! use bioterm_core::CharBuffer;
//! use bioterm_hardware::traits::SensorLink;
//! use bioterm_hardware::Result;
//!
//! async fn finger_present<S: SensorLink>(sensor: &mut S) -> Result<bool> {
//!     match sensor.capture_image().await {
//!         Ok(()) => Ok(true),
//!         Err(e) if e.is_no_finger() => Ok(false),
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides programmable devices for tests and the
//! interactive simulator. [`ChannelKeypad`] is a real keypad fed from a
//! channel, used both by the console binary and by tests. The serial driver for real modules lives in the
//! `bioterm-sensor` crate.
//!
//! [`SensorLink`]: traits::SensorLink
//! [`InputSource`]: traits::InputSource
//! [`DisplaySink`]: traits::DisplaySink
//! [`IndicatorOutput`]: traits::IndicatorOutput

pub mod error;
pub mod keypad;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use keypad::{ChannelKeypad, ChannelKeypadHandle};
pub use traits::{DisplaySink, IndicatorOutput, InputSource, SensorLink};
pub use types::{Indicator, KEYMAP, Key, SearchHit, SensorCode};
