//! Common types shared across hardware device implementations.
//!
//! This module defines the keypad keys, indicator states, and sensor
//! confirmation codes exchanged between the controller and its peripherals.

use bioterm_core::SlotId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legends of the 4×4 keypad, row by row.
pub const KEYMAP: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// A single key press on the 4×4 keypad.
///
/// `*` confirms, `#` cancels or enters administration. The letter keys are
/// delivered but carry no meaning for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Numeric digit (0-9).
    Digit(u8),
    A,
    B,
    C,
    D,
    /// Star key (*), confirm.
    Star,
    /// Hash key (#), cancel.
    Hash,
}

impl Key {
    /// Map a keypad legend to a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_hardware::Key;
    ///
    /// assert_eq!(Key::from_char('7'), Some(Key::Digit(7)));
    /// assert_eq!(Key::from_char('#'), Some(Key::Hash));
    /// assert_eq!(Key::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            'A' | 'a' => Some(Self::A),
            'B' | 'b' => Some(Self::B),
            'C' | 'c' => Some(Self::C),
            'D' | 'd' => Some(Self::D),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            _ => None,
        }
    }

    /// Key at a matrix position, as reported by a row/column scanner.
    pub fn from_matrix(row: usize, col: usize) -> Option<Self> {
        KEYMAP
            .get(row)
            .and_then(|keys| keys.get(col))
            .and_then(|&c| Self::from_char(c))
    }

    /// The legend printed on the key.
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d.min(9)),
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Get the digit value if this is a digit key.
    pub fn as_digit(self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pass/fail signalling state.
///
/// `Success` lights the green LED, `Fail` lights the red LED and sounds the
/// buzzer, `Neutral` turns everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Success,
    Fail,
    Neutral,
}

/// Non-OK confirmation codes returned by the fingerprint module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SensorCode {
    /// Packet receive error on the module side.
    PacketReceive,
    /// No finger on the sensor.
    NoFinger,
    /// Image capture failed.
    ImageFail,
    /// Image too messy to extract features.
    ImageMessy,
    /// Too few feature points.
    FeatureFail,
    /// Fingerprints do not match.
    NoMatch,
    /// Search found no matching template.
    NotFound,
    /// The two enrollment captures could not be merged.
    EnrollMismatch,
    /// Page id beyond the template library.
    BadLocation,
    /// Template deletion failed.
    DeleteFail,
    /// Handshake password rejected.
    WrongPassword,
    /// Writing to flash failed.
    FlashError,
    /// Any other code, kept verbatim.
    Other(u8),
}

impl SensorCode {
    /// Decode a confirmation byte. Returns `None` for OK (0x00).
    pub fn from_u8(code: u8) -> Option<Self> {
        let decoded = match code {
            0x00 => return None,
            0x01 => Self::PacketReceive,
            0x02 => Self::NoFinger,
            0x03 => Self::ImageFail,
            0x06 => Self::ImageMessy,
            0x07 => Self::FeatureFail,
            0x08 => Self::NoMatch,
            0x09 => Self::NotFound,
            0x0A => Self::EnrollMismatch,
            0x0B => Self::BadLocation,
            0x10 => Self::DeleteFail,
            0x13 => Self::WrongPassword,
            0x18 => Self::FlashError,
            other => Self::Other(other),
        };
        Some(decoded)
    }

    /// The confirmation byte as sent by the module.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::PacketReceive => 0x01,
            Self::NoFinger => 0x02,
            Self::ImageFail => 0x03,
            Self::ImageMessy => 0x06,
            Self::FeatureFail => 0x07,
            Self::NoMatch => 0x08,
            Self::NotFound => 0x09,
            Self::EnrollMismatch => 0x0A,
            Self::BadLocation => 0x0B,
            Self::DeleteFail => 0x10,
            Self::WrongPassword => 0x13,
            Self::FlashError => 0x18,
            Self::Other(code) => code,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::PacketReceive => "packet receive error",
            Self::NoFinger => "no finger",
            Self::ImageFail => "image fail",
            Self::ImageMessy => "image messy",
            Self::FeatureFail => "feature fail",
            Self::NoMatch => "no match",
            Self::NotFound => "not found",
            Self::EnrollMismatch => "enroll mismatch",
            Self::BadLocation => "bad location",
            Self::DeleteFail => "delete fail",
            Self::WrongPassword => "wrong password",
            Self::FlashError => "flash error",
            Self::Other(_) => "unknown code",
        }
    }
}

impl fmt::Display for SensorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.description(), self.to_u8())
    }
}

/// Result of a successful fast search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page the matching template is stored in.
    pub page: u16,
    /// Match confidence reported by the module.
    pub score: u16,
}

impl SearchHit {
    /// The matching slot, or `None` if the page lies outside the slot range.
    pub fn slot(&self) -> Option<SlotId> {
        u8::try_from(self.page).ok().and_then(|id| SlotId::new(id).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_keymap_round_trips_legends() {
        for (row, keys) in KEYMAP.iter().enumerate() {
            for (col, &legend) in keys.iter().enumerate() {
                let key = Key::from_matrix(row, col).unwrap();
                assert_eq!(key.as_char(), legend);
            }
        }
        assert_eq!(Key::from_matrix(4, 0), None);
        assert_eq!(Key::from_matrix(0, 4), None);
    }

    #[rstest]
    #[case(3, 0, Key::Star)]
    #[case(3, 1, Key::Digit(0))]
    #[case(3, 2, Key::Hash)]
    #[case(0, 3, Key::A)]
    #[case(2, 2, Key::Digit(9))]
    fn test_matrix_positions(#[case] row: usize, #[case] col: usize, #[case] key: Key) {
        assert_eq!(Key::from_matrix(row, col), Some(key));
    }

    #[test]
    fn test_key_digit() {
        assert_eq!(Key::Digit(4).as_digit(), Some(4));
        assert_eq!(Key::Star.as_digit(), None);
        assert_eq!(Key::from_char('c'), Some(Key::C));
    }

    #[test]
    fn test_sensor_code_ok_is_none() {
        assert_eq!(SensorCode::from_u8(0x00), None);
    }

    #[rstest]
    #[case(0x02, SensorCode::NoFinger)]
    #[case(0x09, SensorCode::NotFound)]
    #[case(0x0A, SensorCode::EnrollMismatch)]
    #[case(0x10, SensorCode::DeleteFail)]
    #[case(0x42, SensorCode::Other(0x42))]
    fn test_sensor_code_decoding(#[case] byte: u8, #[case] code: SensorCode) {
        assert_eq!(SensorCode::from_u8(byte), Some(code));
        assert_eq!(code.to_u8(), byte);
    }

    #[test]
    fn test_sensor_code_display() {
        assert_eq!(SensorCode::NoFinger.to_string(), "no finger (0x02)");
        assert_eq!(SensorCode::Other(0x42).to_string(), "unknown code (0x42)");
    }

    #[test]
    fn test_search_hit_slot() {
        assert_eq!(SearchHit { page: 12, score: 80 }.slot().map(SlotId::as_u8), Some(12));
        assert_eq!(SearchHit { page: 0, score: 80 }.slot(), None);
        assert_eq!(SearchHit { page: 150, score: 80 }.slot(), None);
    }

    #[test]
    fn test_indicator_serialization() {
        let json = serde_json::to_string(&Indicator::Fail).unwrap();
        let back: Indicator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Indicator::Fail);
    }
}
