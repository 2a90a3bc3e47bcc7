//! Serial driver for R30x-family fingerprint modules.
//!
//! - [`packet`]: frame layout, commands and the [`R30xCodec`] used to read
//!   and write them.
//! - [`r30x`]: [`R30xSensor`], a [`SensorLink`] over a byte transport, and
//!   [`open`] for serial ports.
//!
//! [`SensorLink`]: bioterm_hardware::SensorLink

pub mod packet;
pub mod r30x;

pub use packet::{Command, Packet, PacketError, PacketKind, R30xCodec};
pub use r30x::{R30xSensor, SERIAL_TIMEOUT, open};
