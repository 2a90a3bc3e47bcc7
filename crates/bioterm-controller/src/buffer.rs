//! Bounded digit entry buffer.

use std::fmt;

/// Accumulates keypad digits up to a fixed capacity.
///
/// Digits beyond the capacity are ignored; the buffer never grows past it.
///
/// # Examples
///
/// ```
/// use bioterm_controller::DigitBuffer;
///
/// let mut pin = DigitBuffer::new(4);
/// for d in [1, 2, 3, 4, 5] {
///     pin.push(d);
/// }
/// assert_eq!(pin.as_str(), "1234");
/// assert!(pin.is_full());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitBuffer {
    digits: String,
    capacity: usize,
}

impl DigitBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            digits: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a digit. Returns the column it was written to, or `None` if the
    /// buffer is full or `digit` is not 0-9.
    pub fn push(&mut self, digit: u8) -> Option<usize> {
        if self.is_full() || digit > 9 {
            return None;
        }
        let column = self.digits.len();
        self.digits.push(char::from(b'0' + digit));
        Some(column)
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Display for DigitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_reports_column() {
        let mut buffer = DigitBuffer::new(3);
        assert_eq!(buffer.push(1), Some(0));
        assert_eq!(buffer.push(2), Some(1));
        assert_eq!(buffer.push(7), Some(2));
        assert_eq!(buffer.push(9), None);
        assert_eq!(buffer.as_str(), "127");
    }

    #[test]
    fn test_rejects_non_digit() {
        let mut buffer = DigitBuffer::new(3);
        assert_eq!(buffer.push(10), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = DigitBuffer::new(4);
        buffer.push(5);
        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.to_string(), "");
    }
}
