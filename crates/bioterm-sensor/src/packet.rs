//! R30x packet framing.
//!
//! Every exchange with the module is a command packet answered by an
//! acknowledge packet, both in the same frame:
//!
//! ```text
//! EF 01 | address (4, BE) | pid (1) | length (2, BE) | payload | checksum (2, BE)
//! ```
//!
//! `length` counts the payload plus the two checksum bytes. The checksum is
//! the 16-bit wrapping sum of pid, both length bytes and the payload.
//!
//! [`R30xCodec`] implements the tokio-util [`Decoder`]/[`Encoder`] pair, so
//! it works with `Framed` as well as with the blocking driver in
//! [`crate::r30x`], which feeds it bytes by hand.
//!
//! # Examples
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bioterm_sensor::packet::{Command, Packet, R30xCodec};
//!
//! let mut codec = R30xCodec::new();
//! let mut wire = BytesMut::new();
//! codec.encode(Packet::command(0xFFFF_FFFF, Command::GenImage), &mut wire).unwrap();
//!
//! assert_eq!(&wire[..], &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05]);
//!
//! let packet = codec.decode(&mut wire).unwrap().unwrap();
//! assert_eq!(packet.payload, vec![0x01]);
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use bioterm_core::CharBuffer;
use bioterm_hardware::{HardwareError, SensorCode};

/// Frame start marker.
pub const HEADER: [u8; 2] = [0xEF, 0x01];

/// Header, address, pid and length.
const PREAMBLE_LEN: usize = 9;

/// Bytes of checksum at the end of every frame.
const CHECKSUM_LEN: usize = 2;

/// Largest payload accepted when decoding.
///
/// Command and acknowledge payloads are a few bytes; data packets carry at
/// most 256 bytes of template or image data.
pub const DEFAULT_MAX_PAYLOAD: usize = 256;

/// Packet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Command,
    Data,
    Ack,
    EndOfData,
}

impl PacketKind {
    pub fn to_u8(self) -> u8 {
        match self {
            PacketKind::Command => 0x01,
            PacketKind::Data => 0x02,
            PacketKind::Ack => 0x07,
            PacketKind::EndOfData => 0x08,
        }
    }

    pub fn from_u8(pid: u8) -> Option<Self> {
        match pid {
            0x01 => Some(PacketKind::Command),
            0x02 => Some(PacketKind::Data),
            0x07 => Some(PacketKind::Ack),
            0x08 => Some(PacketKind::EndOfData),
            _ => None,
        }
    }
}

/// Instructions the terminal sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Handshake (VfyPwd, 0x13).
    VerifyPassword(u32),
    /// Capture an image (GenImg, 0x01).
    GenImage,
    /// Extract features into a buffer (Img2Tz, 0x02).
    ImageToTz(CharBuffer),
    /// Merge both buffers into a model (RegModel, 0x05).
    RegModel,
    /// Store a buffer at a page (Store, 0x06).
    Store { buffer: CharBuffer, page: u16 },
    /// Delete `count` pages starting at `page` (DeleteChar, 0x0C).
    DeleteChar { page: u16, count: u16 },
    /// Search pages `start..start + count` for a buffer (HiSpeedSearch, 0x1B).
    Search {
        buffer: CharBuffer,
        start: u16,
        count: u16,
    },
}

impl Command {
    /// Instruction code.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::GenImage => 0x01,
            Command::ImageToTz(_) => 0x02,
            Command::RegModel => 0x05,
            Command::Store { .. } => 0x06,
            Command::DeleteChar { .. } => 0x0C,
            Command::VerifyPassword(_) => 0x13,
            Command::Search { .. } => 0x1B,
        }
    }

    /// Opcode followed by the big-endian parameters.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = vec![self.opcode()];
        match *self {
            Command::GenImage | Command::RegModel => {}
            Command::VerifyPassword(password) => payload.extend_from_slice(&password.to_be_bytes()),
            Command::ImageToTz(buffer) => payload.push(buffer.to_u8()),
            Command::Store { buffer, page } => {
                payload.push(buffer.to_u8());
                payload.extend_from_slice(&page.to_be_bytes());
            }
            Command::DeleteChar { page, count } => {
                payload.extend_from_slice(&page.to_be_bytes());
                payload.extend_from_slice(&count.to_be_bytes());
            }
            Command::Search {
                buffer,
                start,
                count,
            } => {
                payload.push(buffer.to_u8());
                payload.extend_from_slice(&start.to_be_bytes());
                payload.extend_from_slice(&count.to_be_bytes());
            }
        }
        payload
    }
}

/// One frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub address: u32,
    pub kind: PacketKind,
    pub payload: Vec<u8>,
}

impl Packet {
    /// A command packet.
    pub fn command(address: u32, command: Command) -> Self {
        Self {
            address,
            kind: PacketKind::Command,
            payload: command.to_payload(),
        }
    }

    /// An acknowledge packet with a confirmation code and extra data.
    pub fn ack(address: u32, code: u8, data: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(1 + data.len());
        payload.push(code);
        payload.extend_from_slice(data);
        Self {
            address,
            kind: PacketKind::Ack,
            payload,
        }
    }

    /// Value of the length field.
    pub fn length_field(&self) -> u16 {
        u16::try_from(self.payload.len() + CHECKSUM_LEN).unwrap_or(u16::MAX)
    }

    /// Wrapping sum of pid, length bytes and payload.
    pub fn checksum(&self) -> u16 {
        checksum(self.kind.to_u8(), self.length_field(), &self.payload)
    }

    /// Interpret an acknowledge packet.
    ///
    /// Returns the bytes after the confirmation code.
    ///
    /// # Errors
    ///
    /// `HardwareError::Sensor` for a non-OK code, `InvalidData` if this is
    /// not an acknowledge packet or it is empty.
    pub fn into_ack_data(self) -> Result<Vec<u8>, HardwareError> {
        if self.kind != PacketKind::Ack {
            return Err(HardwareError::invalid_data(format!(
                "Expected acknowledge packet, got {:?}",
                self.kind
            )));
        }
        let (&code, data) = self
            .payload
            .split_first()
            .ok_or_else(|| HardwareError::invalid_data("Empty acknowledge packet"))?;
        match SensorCode::from_u8(code) {
            None => Ok(data.to_vec()),
            Some(code) => Err(HardwareError::Sensor(code)),
        }
    }
}

fn checksum(pid: u8, length: u16, payload: &[u8]) -> u16 {
    let [hi, lo] = length.to_be_bytes();
    payload
        .iter()
        .chain([pid, hi, lo].iter())
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Framing errors.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("Bad packet header: {0:02X?}")]
    BadHeader([u8; 2]),

    #[error("Invalid packet length field: {length} (max payload {max_payload})")]
    InvalidLength { length: u16, max_payload: usize },

    #[error("Unknown packet identifier: 0x{0:02X}")]
    UnknownKind(u8),

    #[error("Checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("Payload of {size} bytes exceeds {max_payload}")]
    PayloadTooLarge { size: usize, max_payload: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PacketError> for HardwareError {
    fn from(err: PacketError) -> Self {
        match err {
            PacketError::Io(e) => HardwareError::Io(e),
            other => HardwareError::invalid_data(other.to_string()),
        }
    }
}

/// Codec for R30x frames.
///
/// On a framing error the offending bytes are skipped so the next call can
/// resynchronise on the following header.
#[derive(Debug)]
pub struct R30xCodec {
    max_payload: usize,
}

impl R30xCodec {
    pub fn new() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for R30xCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for R30xCodec {
    type Item = Packet;
    type Error = PacketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, PacketError> {
        if src.len() < HEADER.len() {
            return Ok(None);
        }
        if src[..2] != HEADER {
            let found = [src[0], src[1]];
            src.advance(1);
            return Err(PacketError::BadHeader(found));
        }
        if src.len() < PREAMBLE_LEN {
            return Ok(None);
        }

        let length = u16::from_be_bytes([src[7], src[8]]);
        let payload_len = usize::from(length).checked_sub(CHECKSUM_LEN);
        let payload_len = match payload_len {
            Some(len) if len <= self.max_payload => len,
            _ => {
                src.advance(HEADER.len());
                return Err(PacketError::InvalidLength {
                    length,
                    max_payload: self.max_payload,
                });
            }
        };

        let total = PREAMBLE_LEN + payload_len + CHECKSUM_LEN;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(total);
        frame.advance(HEADER.len());
        let address = frame.get_u32();
        let pid = frame.get_u8();
        let _length = frame.get_u16();
        let payload = frame.split_to(payload_len).to_vec();
        let actual = frame.get_u16();

        let kind = PacketKind::from_u8(pid).ok_or(PacketError::UnknownKind(pid))?;
        let expected = checksum(pid, length, &payload);
        if expected != actual {
            return Err(PacketError::ChecksumMismatch { expected, actual });
        }

        Ok(Some(Packet {
            address,
            kind,
            payload,
        }))
    }
}

impl Encoder<Packet> for R30xCodec {
    type Error = PacketError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), PacketError> {
        if item.payload.len() > self.max_payload {
            return Err(PacketError::PayloadTooLarge {
                size: item.payload.len(),
                max_payload: self.max_payload,
            });
        }

        dst.reserve(PREAMBLE_LEN + item.payload.len() + CHECKSUM_LEN);
        dst.put_slice(&HEADER);
        dst.put_u32(item.address);
        dst.put_u8(item.kind.to_u8());
        dst.put_u16(item.length_field());
        dst.put_slice(&item.payload);
        dst.put_u16(item.checksum());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const ADDR: u32 = 0xFFFF_FFFF;

    fn encode(packet: Packet) -> BytesMut {
        let mut wire = BytesMut::new();
        R30xCodec::new().encode(packet, &mut wire).unwrap();
        wire
    }

    #[rstest]
    #[case(Command::GenImage, vec![0x01])]
    #[case(Command::RegModel, vec![0x05])]
    #[case(Command::ImageToTz(CharBuffer::Two), vec![0x02, 0x02])]
    #[case(Command::VerifyPassword(0), vec![0x13, 0, 0, 0, 0])]
    #[case(Command::Store { buffer: CharBuffer::One, page: 0x0102 }, vec![0x06, 0x01, 0x01, 0x02])]
    #[case(Command::DeleteChar { page: 7, count: 1 }, vec![0x0C, 0x00, 0x07, 0x00, 0x01])]
    #[case(
        Command::Search { buffer: CharBuffer::One, start: 0, count: 163 },
        vec![0x1B, 0x01, 0x00, 0x00, 0x00, 0xA3]
    )]
    fn test_command_payloads(#[case] command: Command, #[case] payload: Vec<u8>) {
        assert_eq!(command.to_payload(), payload);
    }

    #[test]
    fn test_handshake_frame() {
        let wire = encode(Packet::command(ADDR, Command::VerifyPassword(0)));
        assert_eq!(
            &wire[..],
            &[
                0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x07, 0x13, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x1B
            ]
        );
    }

    #[test]
    fn test_decode_ack() {
        let mut wire = encode(Packet::ack(ADDR, 0x00, &[0x00, 0x05, 0x00, 0x64]));
        let packet = R30xCodec::new().decode(&mut wire).unwrap().unwrap();

        assert_eq!(packet.kind, PacketKind::Ack);
        assert_eq!(packet.address, ADDR);
        assert_eq!(packet.into_ack_data().unwrap(), vec![0x00, 0x05, 0x00, 0x64]);
        assert!(wire.is_empty());
    }

    #[test]
    fn test_partial_frame_waits() {
        let full = encode(Packet::ack(ADDR, 0x00, &[]));
        let mut codec = R30xCodec::new();
        let mut wire = BytesMut::new();

        for (i, byte) in full.iter().enumerate() {
            wire.put_u8(*byte);
            let decoded = codec.decode(&mut wire).unwrap();
            if i + 1 < full.len() {
                assert!(decoded.is_none(), "decoded early at byte {i}");
            } else {
                assert!(decoded.is_some());
            }
        }
    }

    #[test]
    fn test_two_frames_in_one_read() {
        let mut wire = encode(Packet::ack(ADDR, 0x02, &[]));
        wire.extend_from_slice(&encode(Packet::ack(ADDR, 0x00, &[])));
        let mut codec = R30xCodec::new();

        let first = codec.decode(&mut wire).unwrap().unwrap();
        let second = codec.decode(&mut wire).unwrap().unwrap();
        assert!(matches!(
            first.into_ack_data(),
            Err(HardwareError::Sensor(SensorCode::NoFinger))
        ));
        assert!(second.into_ack_data().is_ok());
        assert!(codec.decode(&mut wire).unwrap().is_none());
    }

    #[test]
    fn test_bad_header_skips_and_resyncs() {
        let mut wire = BytesMut::from(&[0x00, 0x42][..]);
        wire.extend_from_slice(&encode(Packet::ack(ADDR, 0x00, &[])));
        let mut codec = R30xCodec::new();

        assert!(matches!(
            codec.decode(&mut wire),
            Err(PacketError::BadHeader([0x00, 0x42]))
        ));
        assert!(codec.decode(&mut wire).is_err());
        assert!(codec.decode(&mut wire).unwrap().is_some());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut wire = encode(Packet::ack(ADDR, 0x00, &[]));
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;

        assert!(matches!(
            R30xCodec::new().decode(&mut wire),
            Err(PacketError::ChecksumMismatch { .. })
        ));
        assert!(wire.is_empty());
    }

    #[rstest]
    #[case(0x0000)]
    #[case(0x0001)]
    #[case(0x0200)]
    fn test_invalid_length(#[case] length: u16) {
        let [hi, lo] = length.to_be_bytes();
        let mut wire = BytesMut::from(&[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, hi, lo][..]);

        assert!(matches!(
            R30xCodec::new().decode(&mut wire),
            Err(PacketError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_unknown_pid() {
        let mut packet = encode(Packet::ack(ADDR, 0x00, &[]));
        packet[6] = 0x09;
        assert!(matches!(
            R30xCodec::new().decode(&mut packet),
            Err(PacketError::UnknownKind(0x09))
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let packet = Packet {
            address: ADDR,
            kind: PacketKind::Data,
            payload: vec![0; 300],
        };
        let mut wire = BytesMut::new();
        assert!(matches!(
            R30xCodec::new().encode(packet, &mut wire),
            Err(PacketError::PayloadTooLarge { size: 300, .. })
        ));
        assert!(wire.is_empty());
    }

    #[test]
    fn test_ack_interpretation_errors() {
        let not_ack = Packet::command(ADDR, Command::GenImage);
        assert!(matches!(
            not_ack.into_ack_data(),
            Err(HardwareError::InvalidData { .. })
        ));

        let empty = Packet {
            address: ADDR,
            kind: PacketKind::Ack,
            payload: Vec::new(),
        };
        assert!(empty.into_ack_data().is_err());
    }

    proptest! {
        #[test]
        fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let mut wire = BytesMut::from(&bytes[..]);
            let mut codec = R30xCodec::new();
            for _ in 0..bytes.len() + 1 {
                if let Ok(None) = codec.decode(&mut wire) {
                    break;
                }
            }
        }

        #[test]
        fn prop_any_ack_survives_framing(
            address in any::<u32>(),
            code in any::<u8>(),
            data in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let packet = Packet::ack(address, code, &data);
            let mut wire = encode(packet.clone());
            let decoded = R30xCodec::new().decode(&mut wire).unwrap();
            prop_assert_eq!(decoded, Some(packet));
        }
    }
}
