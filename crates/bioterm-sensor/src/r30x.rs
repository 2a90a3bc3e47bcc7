//! Serial driver for R30x-family fingerprint modules.
//!
//! [`R30xSensor`] implements [`SensorLink`] over any blocking byte transport
//! (a serial port in production, an in-memory script in tests). Each trait
//! method is one command/acknowledge exchange. The transport's read timeout
//! bounds how long a single exchange can block.

use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, trace};

use bioterm_core::{CharBuffer, SensorConfig, SlotId};
use bioterm_hardware::traits::SensorLink;
use bioterm_hardware::{HardwareError, Result, SearchHit};

use crate::packet::{Command, Packet, PacketError, R30xCodec};

/// Read timeout applied to serial ports opened by [`open`].
pub const SERIAL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 64;

/// Fingerprint module behind a byte transport.
///
/// # Blocking
///
/// The transport is a blocking `Read + Write`, so every `SensorLink` call
/// occupies the calling runtime thread until the reply arrives or the read
/// timeout ([`SERIAL_TIMEOUT`] for ports from [`open`]) expires. The
/// controller is a single task that awaits each exchange in turn, so nothing
/// else is starved; do not share the runtime thread with latency-sensitive
/// tasks.
pub struct R30xSensor<T> {
    transport: T,
    codec: R30xCodec,
    rx: BytesMut,
    tx: BytesMut,
    address: u32,
    password: u32,
    capacity: u16,
    name: String,
}

impl<T: Read + Write + Send> R30xSensor<T> {
    /// Wrap a transport using the address, password and library size from
    /// configuration.
    pub fn new(transport: T, config: &SensorConfig) -> Self {
        Self {
            transport,
            codec: R30xCodec::new(),
            rx: BytesMut::with_capacity(READ_CHUNK),
            tx: BytesMut::with_capacity(READ_CHUNK),
            address: config.address,
            password: config.password,
            capacity: config.capacity,
            name: config.port.clone().unwrap_or_else(|| "R30x".to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send one command and return the acknowledge data.
    fn transact(&mut self, command: Command) -> Result<Vec<u8>> {
        trace!(?command, "Sending command");
        // Leftovers belong to an earlier exchange.
        self.rx.clear();
        self.send(command)?;
        let reply = self.receive()?;
        if reply.address != self.address {
            debug!(
                expected = self.address,
                actual = reply.address,
                "Reply from unexpected address"
            );
        }
        reply.into_ack_data()
    }

    fn send(&mut self, command: Command) -> Result<()> {
        self.tx.clear();
        self.codec
            .encode(Packet::command(self.address, command), &mut self.tx)?;
        self.transport.write_all(&self.tx)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Read until one well-formed frame arrives.
    ///
    /// Framing errors are skipped past; the codec has already dropped the
    /// offending bytes. If the port then goes quiet, the last framing error is
    /// reported instead of a bare timeout.
    fn receive(&mut self) -> Result<Packet> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut corrupt: Option<PacketError> = None;
        loop {
            match self.codec.decode(&mut self.rx) {
                Ok(Some(packet)) => return Ok(packet),
                Ok(None) => {}
                Err(e) => {
                    debug!(device = %self.name, error = %e, "Discarding corrupt bytes");
                    corrupt = Some(e);
                    continue;
                }
            }

            let read = match self.transport.read(&mut chunk) {
                Ok(0) => return Err(HardwareError::disconnected(&self.name)),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    self.rx.clear();
                    if let Some(e) = corrupt {
                        return Err(e.into());
                    }
                    let waited = u64::try_from(SERIAL_TIMEOUT.as_millis()).unwrap_or(u64::MAX);
                    return Err(HardwareError::timeout(waited));
                }
                Err(e) => return Err(e.into()),
            };
            self.rx.extend_from_slice(&chunk[..read]);
        }
    }
}

impl<T: Read + Write + Send> SensorLink for R30xSensor<T> {
    async fn verify_password(&mut self) -> Result<()> {
        self.transact(Command::VerifyPassword(self.password))?;
        info!(device = %self.name, "Sensor handshake succeeded");
        Ok(())
    }

    async fn capture_image(&mut self) -> Result<()> {
        self.transact(Command::GenImage).map(drop)
    }

    async fn image_to_template(&mut self, buffer: CharBuffer) -> Result<()> {
        self.transact(Command::ImageToTz(buffer)).map(drop)
    }

    async fn create_model(&mut self) -> Result<()> {
        self.transact(Command::RegModel).map(drop)
    }

    async fn store_model(&mut self, slot: SlotId, buffer: CharBuffer) -> Result<()> {
        self.transact(Command::Store {
            buffer,
            page: slot.page(),
        })
        .map(drop)
    }

    async fn delete_model(&mut self, slot: SlotId) -> Result<()> {
        self.transact(Command::DeleteChar {
            page: slot.page(),
            count: 1,
        })
        .map(drop)
    }

    async fn fast_search(&mut self, buffer: CharBuffer) -> Result<SearchHit> {
        let data = self.transact(Command::Search {
            buffer,
            start: 0,
            count: self.capacity,
        })?;
        match data[..] {
            [p0, p1, s0, s1, ..] => Ok(SearchHit {
                page: u16::from_be_bytes([p0, p1]),
                score: u16::from_be_bytes([s0, s1]),
            }),
            _ => Err(HardwareError::invalid_data(format!(
                "Search reply too short: {} bytes",
                data.len()
            ))),
        }
    }
}

/// Open a serial port and wrap it.
///
/// # Errors
///
/// Returns `InitializationFailed` if no port is configured or it cannot be
/// opened.
pub fn open(config: &SensorConfig) -> Result<R30xSensor<Box<dyn serialport::SerialPort>>> {
    let path = config
        .port
        .as_deref()
        .ok_or_else(|| HardwareError::initialization_failed("No sensor port configured"))?;

    let port = serialport::new(path, config.baud)
        .timeout(SERIAL_TIMEOUT)
        .open()
        .map_err(|e| HardwareError::initialization_failed(format!("{path}: {e}")))?;

    info!(port = path, baud = config.baud, "Opened sensor serial port");
    Ok(R30xSensor::new(port, config))
}
