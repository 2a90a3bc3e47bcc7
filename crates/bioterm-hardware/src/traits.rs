//! Hardware device trait definitions.
//!
//! This module defines the contract between the terminal controller and its
//! peripherals: the fingerprint sensor link, the keypad, the character
//! display, and the pass/fail indicators. Mock and real implementations are
//! interchangeable behind these traits.
//!
//! Device I/O that can take measurable time (the sensor, waiting for a key)
//! uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT), so the
//! controller can race a sensor wait against a keypad cancel. Display and
//! indicator writes are fire-and-forget and stay synchronous.

#![allow(async_fn_in_trait)]

use bioterm_core::{CharBuffer, SlotId};

use crate::error::Result;
use crate::types::{Indicator, Key, SearchHit};

/// Source of key presses.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use bioterm_hardware::traits::InputSource;
/// use bioterm_hardware::{Key, Result};
///
/// async fn wait_for_confirm<K: InputSource>(keypad: &mut K) -> Result<()> {
///     while keypad.read_key().await? != Key::Star {}
///     Ok(())
/// }
/// ```
pub trait InputSource: Send {
    /// Take the next pending key press without waiting.
    ///
    /// Returns `Ok(None)` when no key is pending.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Disconnected`](crate::HardwareError::Disconnected)
    /// once the source can never produce another key.
    fn try_read_key(&mut self) -> Result<Option<Key>>;

    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Disconnected`](crate::HardwareError::Disconnected)
    /// once the source can never produce another key.
    async fn read_key(&mut self) -> Result<Key>;
}

/// Link to a fingerprint module with an on-board template library.
///
/// Every method maps to one command of the module. A non-OK confirmation code
/// is returned as [`HardwareError::Sensor`](crate::HardwareError::Sensor);
/// "no finger" from [`capture_image`](SensorLink::capture_image) is the
/// normal idle answer, not a failure.
///
/// # Examples
///
/// ```no_run
/// use bioterm_core::CharBuffer;
/// use bioterm_hardware::traits::SensorLink;
/// use bioterm_hardware::Result;
///
/// async fn identify<S: SensorLink>(sensor: &mut S) -> Result<u16> {
///     sensor.capture_image().await?;
///     sensor.image_to_template(CharBuffer::One).await?;
///     let hit = sensor.fast_search(CharBuffer::One).await?;
///     Ok(hit.page)
/// }
/// ```
pub trait SensorLink: Send {
    /// Handshake with the module.
    ///
    /// # Errors
    ///
    /// Fails when the module is absent, miswired, or rejects the password.
    async fn verify_password(&mut self) -> Result<()>;

    /// Capture a fingerprint image into the module's image buffer.
    ///
    /// # Errors
    ///
    /// `SensorCode::NoFinger` when nothing is on the sensor, other codes for
    /// a bad frame.
    async fn capture_image(&mut self) -> Result<()>;

    /// Extract features from the captured image into a feature buffer.
    ///
    /// # Errors
    ///
    /// Returns the sensor code when feature extraction fails.
    async fn image_to_template(&mut self, buffer: CharBuffer) -> Result<()>;

    /// Merge both feature buffers into one model.
    ///
    /// # Errors
    ///
    /// `SensorCode::EnrollMismatch` when the two captures are from different
    /// fingers.
    async fn create_model(&mut self) -> Result<()>;

    /// Store a feature buffer at a slot, overwriting whatever was there.
    ///
    /// # Errors
    ///
    /// Returns the sensor code when the write fails.
    async fn store_model(&mut self, slot: SlotId, buffer: CharBuffer) -> Result<()>;

    /// Delete the template at a slot.
    ///
    /// # Errors
    ///
    /// Returns whatever code the module reports; modules differ on whether
    /// deleting an empty slot is an error.
    async fn delete_model(&mut self, slot: SlotId) -> Result<()>;

    /// Search the whole library for the template in a feature buffer.
    ///
    /// # Errors
    ///
    /// `SensorCode::NotFound` when nothing matches.
    async fn fast_search(&mut self, buffer: CharBuffer) -> Result<SearchHit>;
}

/// Character display with a fixed number of lines.
pub trait DisplaySink {
    /// Clear the display and show two lines.
    fn show(&mut self, top: &str, bottom: &str);

    /// Write text at a position without clearing.
    ///
    /// Writes outside the display are clipped.
    fn write_at(&mut self, row: usize, col: usize, text: &str);
}

/// Pass/fail indicators (LEDs and buzzer).
pub trait IndicatorOutput {
    /// Drive the indicators to a state.
    fn set_indicator(&mut self, state: Indicator);
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn show(&mut self, top: &str, bottom: &str) {
        (**self).show(top, bottom);
    }

    fn write_at(&mut self, row: usize, col: usize, text: &str) {
        (**self).write_at(row, col, text);
    }
}

impl<T: IndicatorOutput + ?Sized> IndicatorOutput for &mut T {
    fn set_indicator(&mut self, state: Indicator) {
        (**self).set_indicator(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lines(Vec<String>);

    impl DisplaySink for Lines {
        fn show(&mut self, top: &str, bottom: &str) {
            self.0 = vec![top.to_string(), bottom.to_string()];
        }

        fn write_at(&mut self, row: usize, _col: usize, text: &str) {
            if let Some(line) = self.0.get_mut(row) {
                line.push_str(text);
            }
        }
    }

    fn render(mut sink: impl DisplaySink) {
        sink.show("Enter PIN:", "");
        sink.write_at(1, 0, "*");
    }

    #[test]
    fn test_display_sink_through_reference() {
        let mut lines = Lines(Vec::new());
        render(&mut lines);
        assert_eq!(lines.0, vec!["Enter PIN:", "*"]);
    }

    #[test]
    fn test_indicator_through_reference() {
        struct Last(Option<Indicator>);
        impl IndicatorOutput for Last {
            fn set_indicator(&mut self, state: Indicator) {
                self.0 = Some(state);
            }
        }

        let mut last = Last(None);
        {
            let mut by_ref = &mut last;
            by_ref.set_indicator(Indicator::Success);
        }
        assert_eq!(last.0, Some(Indicator::Success));
    }
}
