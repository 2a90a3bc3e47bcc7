//! Channel-backed keypad.
//!
//! Key presses are fed through a channel by a [`ChannelKeypadHandle`], from
//! a console reader thread in the binary or from a test. The
//! channel buffers presses until the controller drains them, so presses made
//! while the controller is busy are delayed rather than lost.

use crate::{HardwareError, Key, Result, traits::InputSource};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Keypad whose presses arrive over an in-process channel.
///
/// # Examples
///
/// ```
/// use bioterm_hardware::ChannelKeypad;
/// use bioterm_hardware::traits::InputSource;
/// use bioterm_hardware::Key;
///
/// #[tokio::main]
/// async fn main() -> bioterm_hardware::Result<()> {
///     let (mut keypad, handle) = ChannelKeypad::new();
///
///     handle.press_str("#12")?;
///
///     assert_eq!(keypad.try_read_key()?, Some(Key::Hash));
///     assert_eq!(keypad.read_key().await?, Key::Digit(1));
///     assert_eq!(keypad.read_key().await?, Key::Digit(2));
///     assert_eq!(keypad.try_read_key()?, None);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ChannelKeypad {
    /// Receiver for key presses
    key_rx: mpsc::UnboundedReceiver<Key>,

    /// Device name
    name: String,
}

impl ChannelKeypad {
    /// Create a keypad with the default name.
    pub fn new() -> (Self, ChannelKeypadHandle) {
        Self::with_name("Keypad".to_string())
    }

    /// Create a keypad with a custom name.
    pub fn with_name(name: String) -> (Self, ChannelKeypadHandle) {
        let (key_tx, key_rx) = mpsc::unbounded_channel();

        let keypad = Self {
            key_rx,
            name: name.clone(),
        };

        let handle = ChannelKeypadHandle { key_tx, name };

        (keypad, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl InputSource for ChannelKeypad {
    fn try_read_key(&mut self) -> Result<Option<Key>> {
        match self.key_rx.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(&self.name)),
        }
    }

    async fn read_key(&mut self) -> Result<Key> {
        self.key_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(&self.name))
    }
}

/// Handle for pressing keys on a [`ChannelKeypad`].
///
/// Cloneable and usable from plain threads: sending never blocks.
#[derive(Debug, Clone)]
pub struct ChannelKeypadHandle {
    /// Sender for key presses
    key_tx: mpsc::UnboundedSender<Key>,

    /// Device name
    name: String,
}

impl ChannelKeypadHandle {
    /// Press a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub fn press(&self, key: Key) -> Result<()> {
        self.key_tx
            .send(key)
            .map_err(|_| HardwareError::disconnected(&self.name))
    }

    /// Press every key in a sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub fn press_all(&self, keys: impl IntoIterator<Item = Key>) -> Result<()> {
        keys.into_iter().try_for_each(|key| self.press(key))
    }

    /// Press the keys whose legends make up `legends`, e.g. `"#1234*"`.
    ///
    /// # Errors
    ///
    /// Returns an error for a character that is not on the keypad, or if the
    /// keypad has been dropped. Keys before the bad character are sent.
    pub fn press_str(&self, legends: &str) -> Result<()> {
        for c in legends.chars() {
            let key = Key::from_char(c)
                .ok_or_else(|| HardwareError::invalid_data(format!("No key labelled {c:?}")))?;
            self.press(key)?;
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
