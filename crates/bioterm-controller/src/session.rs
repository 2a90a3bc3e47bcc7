//! Key interpretation.
//!
//! [`Session::apply`] is the whole keypad state machine: given the current
//! mode, the entry buffers and one key, it updates the mode and buffers and
//! returns the [`Action`] the terminal must perform. It does no I/O, so every
//! transition can be tested without peripherals or time.
//!
//! | Mode                | Key      | Result                                   |
//! |---------------------|----------|------------------------------------------|
//! | Idle                | `#`      | AdminAuthenticating, prompt for PIN      |
//! | AdminAuthenticating | digit    | append to PIN (max 4), echo `*`          |
//! | AdminAuthenticating | `*`      | AdminMenu if PIN matches, else Idle      |
//! | AdminAuthenticating | `#`      | Idle                                     |
//! | AdminMenu           | `1`/`2`  | EnrollIdEntry / DeleteIdEntry            |
//! | AdminMenu           | `0`      | Idle                                     |
//! | Enroll/DeleteIdEntry| digit    | append to id (max 3), echo digit         |
//! | Enroll/DeleteIdEntry| `*`      | run protocol if id in 1..=127, AdminMenu |
//! | Enroll/DeleteIdEntry| `#`      | AdminMenu                                |
//!
//! Every other key is ignored. Both buffers are cleared on every mode change.

use tracing::debug;

use bioterm_core::constants::{ID_BUFFER_LENGTH, PIN_LENGTH};
use bioterm_core::{AdminPin, Result, SlotId};
use bioterm_hardware::Key;

use crate::buffer::DigitBuffer;
use crate::mode::{Mode, ModeTracker, ModeTransition};

/// What the terminal must do in response to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing happens.
    Ignored,
    /// Entered `AdminAuthenticating`: prompt for the PIN.
    PromptPin,
    /// A PIN digit was accepted: echo a mask character at `column`.
    EchoMasked { column: usize },
    /// The PIN matched: entered `AdminMenu`.
    PinAccepted,
    /// The PIN did not match: back in `Idle`.
    PinRejected,
    /// Left administration: back in `Idle`.
    ExitToIdle,
    /// Entered `EnrollIdEntry`.
    PromptEnrollId,
    /// Entered `DeleteIdEntry`.
    PromptDeleteId,
    /// An id digit was accepted: echo it at `column`.
    EchoDigit { column: usize, digit: u8 },
    /// The id was empty or out of range: back in `AdminMenu`.
    BadId,
    /// Enroll into a slot. Already back in `AdminMenu`.
    Enroll(SlotId),
    /// Delete a slot. Already back in `AdminMenu`.
    Delete(SlotId),
    /// Id entry abandoned: back in `AdminMenu`.
    BackToMenu,
}

/// Mode, entry buffers and transition history of the terminal.
#[derive(Debug, Clone)]
pub struct Session {
    tracker: ModeTracker,
    pin: DigitBuffer,
    id: DigitBuffer,
}

impl Session {
    /// A fresh session in `Idle` with empty buffers.
    pub fn new() -> Self {
        Self {
            tracker: ModeTracker::new(),
            pin: DigitBuffer::new(PIN_LENGTH),
            id: DigitBuffer::new(ID_BUFFER_LENGTH),
        }
    }

    pub fn mode(&self) -> Mode {
        self.tracker.current_mode()
    }

    pub fn tracker(&self) -> &ModeTracker {
        &self.tracker
    }

    /// Digits typed so far in `AdminAuthenticating`.
    pub fn pin_buffer(&self) -> &DigitBuffer {
        &self.pin
    }

    /// Digits typed so far in the id entry modes.
    pub fn id_buffer(&self) -> &DigitBuffer {
        &self.id
    }

    /// Interpret one key.
    ///
    /// # Errors
    ///
    /// Only fails if the transition table and this function disagree, which
    /// the tests rule out.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_controller::{Action, Mode, Session};
    /// use bioterm_core::AdminPin;
    /// use bioterm_hardware::Key;
    ///
    /// let pin = AdminPin::default();
    /// let mut session = Session::new();
    ///
    /// assert_eq!(session.apply(Key::Hash, &pin).unwrap(), Action::PromptPin);
    /// for d in [1, 2, 3, 4] {
    ///     session.apply(Key::Digit(d), &pin).unwrap();
    /// }
    /// assert_eq!(session.apply(Key::Star, &pin).unwrap(), Action::PinAccepted);
    /// assert_eq!(session.mode(), Mode::AdminMenu);
    /// ```
    pub fn apply(&mut self, key: Key, admin_pin: &AdminPin) -> Result<Action> {
        let action = match (self.mode(), key) {
            (Mode::Idle, Key::Hash) => {
                self.enter(Mode::AdminAuthenticating)?;
                Action::PromptPin
            }

            (Mode::AdminAuthenticating, Key::Digit(d)) => match self.pin.push(d) {
                Some(column) => Action::EchoMasked { column },
                None => Action::Ignored,
            },
            (Mode::AdminAuthenticating, Key::Star) => {
                let accepted = admin_pin.matches(self.pin.as_str());
                if accepted {
                    self.enter(Mode::AdminMenu)?;
                    Action::PinAccepted
                } else {
                    self.enter(Mode::Idle)?;
                    Action::PinRejected
                }
            }
            (Mode::AdminAuthenticating, Key::Hash) => {
                self.enter(Mode::Idle)?;
                Action::ExitToIdle
            }

            (Mode::AdminMenu, Key::Digit(1)) => {
                self.enter(Mode::EnrollIdEntry)?;
                Action::PromptEnrollId
            }
            (Mode::AdminMenu, Key::Digit(2)) => {
                self.enter(Mode::DeleteIdEntry)?;
                Action::PromptDeleteId
            }
            (Mode::AdminMenu, Key::Digit(0)) => {
                self.enter(Mode::Idle)?;
                Action::ExitToIdle
            }

            (Mode::EnrollIdEntry | Mode::DeleteIdEntry, Key::Digit(d)) => {
                match self.id.push(d) {
                    Some(column) => Action::EchoDigit { column, digit: d },
                    None => Action::Ignored,
                }
            }
            (mode @ (Mode::EnrollIdEntry | Mode::DeleteIdEntry), Key::Star) => {
                let slot = SlotId::parse(self.id.as_str());
                self.enter(Mode::AdminMenu)?;
                match (slot, mode) {
                    (None, _) => Action::BadId,
                    (Some(slot), Mode::EnrollIdEntry) => Action::Enroll(slot),
                    (Some(slot), _) => Action::Delete(slot),
                }
            }
            (Mode::EnrollIdEntry | Mode::DeleteIdEntry, Key::Hash) => {
                self.enter(Mode::AdminMenu)?;
                Action::BackToMenu
            }

            _ => Action::Ignored,
        };

        Ok(action)
    }

    fn enter(&mut self, mode: Mode) -> Result<ModeTransition> {
        let transition = self.tracker.transition_to(mode)?;
        self.pin.clear();
        self.id.clear();
        debug!(from = %transition.from, to = %transition.to, "Mode changed");
        Ok(transition)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
