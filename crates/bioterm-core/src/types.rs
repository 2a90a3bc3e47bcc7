use crate::{
    Result,
    constants::{MAX_SLOT_ID, MIN_SLOT_ID, PIN_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Template slot identifier (1..=127).
///
/// Slots address templates held in the sensor's own persistent store. The
/// terminal never tracks which slots are occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    /// Create a new slot id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidSlotId` if the id is outside `1..=127`.
    pub fn new(id: u8) -> Result<Self> {
        if !(MIN_SLOT_ID..=MAX_SLOT_ID).contains(&id) {
            return Err(Error::InvalidSlotId(u32::from(id)));
        }
        Ok(SlotId(id))
    }

    /// Parse the digits typed on the keypad into a slot id.
    ///
    /// Returns `None` for an empty buffer, non-digit input, zero, or any
    /// value above 127. `None` is the invalid-id sentinel the controller
    /// reports as "Bad ID".
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_core::SlotId;
    ///
    /// assert_eq!(SlotId::parse("5").map(SlotId::as_u8), Some(5));
    /// assert_eq!(SlotId::parse("127").map(SlotId::as_u8), Some(127));
    /// assert_eq!(SlotId::parse("128"), None);
    /// assert_eq!(SlotId::parse("0"), None);
    /// assert_eq!(SlotId::parse(""), None);
    /// ```
    #[must_use]
    pub fn parse(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = digits
            .bytes()
            .try_fold(0u32, |acc, b| acc.checked_mul(10)?.checked_add(u32::from(b - b'0')))?;
        u8::try_from(value).ok().and_then(|id| SlotId::new(id).ok())
    }

    /// Get the raw slot id as u8.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Get the slot id as the 16-bit page number used on the sensor link.
    #[must_use]
    pub fn page(self) -> u16 {
        u16::from(self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SlotId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SlotId::parse(s).ok_or_else(|| match s.parse::<u32>() {
            Ok(value) => Error::InvalidSlotId(value),
            Err(_) => Error::MalformedSlotId(s.to_string()),
        })
    }
}

impl TryFrom<u8> for SlotId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        SlotId::new(value)
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> Self {
        slot.0
    }
}

/// Administrative PIN (exactly four ASCII digits).
///
/// # Security
/// Comparison runs in constant time and never reveals how many leading digits
/// matched. The `Debug` output is redacted.
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdminPin(String);

impl AdminPin {
    /// Create a new admin PIN with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` unless the PIN is exactly four ASCII digits.
    pub fn new(pin: &str) -> Result<Self> {
        if pin.len() != PIN_LENGTH {
            return Err(Error::InvalidPin(format!(
                "PIN must be {PIN_LENGTH} digits, got {}",
                pin.len()
            )));
        }
        if !pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPin("PIN must contain only digits".to_string()));
        }
        Ok(AdminPin(pin.to_string()))
    }

    /// Check a typed PIN against this one.
    ///
    /// Exact, length-sensitive equality: `"123"` and `"12345"` never match
    /// `"1234"`.
    #[must_use]
    pub fn matches(&self, entered: &str) -> bool {
        self.0.as_bytes().ct_eq(entered.as_bytes()).into()
    }
}

impl Default for AdminPin {
    fn default() -> Self {
        AdminPin(crate::constants::DEFAULT_ADMIN_PIN.to_string())
    }
}

impl PartialEq for AdminPin {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl fmt::Debug for AdminPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AdminPin(****)")
    }
}

impl TryFrom<String> for AdminPin {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        AdminPin::new(&value)
    }
}

impl From<AdminPin> for String {
    fn from(pin: AdminPin) -> Self {
        pin.0
    }
}

/// Feature buffer on the sensor that a converted image is written to.
///
/// Enrollment fills both buffers and merges them; verification and storage
/// use buffer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CharBuffer {
    One = 1,
    Two = 2,
}

impl CharBuffer {
    /// Buffer number as sent on the sensor link.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CharBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}
