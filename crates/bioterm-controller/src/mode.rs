//! Terminal modes and the mode tracker.
//!
//! The terminal is always in exactly one [`Mode`]. The mode alone decides how
//! a key press is interpreted.
//!
//! # Valid Transitions
//!
//! - Idle → AdminAuthenticating (`#`)
//! - AdminAuthenticating → AdminMenu (correct PIN) / Idle (wrong PIN, `#`)
//! - AdminMenu → EnrollIdEntry (`1`) / DeleteIdEntry (`2`) / Idle (`0`)
//! - EnrollIdEntry, DeleteIdEntry → AdminMenu (`*`, `#`)
//!
//! # Examples
//!
//! ```
//! use bioterm_controller::{Mode, ModeTracker};
//!
//! let mut tracker = ModeTracker::new();
//! assert_eq!(tracker.current_mode(), Mode::Idle);
//!
//! tracker.transition_to(Mode::AdminAuthenticating).unwrap();
//! assert!(tracker.transition_to(Mode::EnrollIdEntry).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use bioterm_core::{Error, Result};

/// Maximum number of mode transitions to keep in history.
///
/// A full enroll session (authenticate, menu, id entry, back, exit) is five
/// transitions, so this covers the last twenty administrative sessions.
const MAX_HISTORY_SIZE: usize = 100;

/// Interaction mode of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Waiting for a finger; `#` enters administration.
    Idle,

    /// Collecting the admin PIN.
    AdminAuthenticating,

    /// Admin menu: enroll, delete or exit.
    AdminMenu,

    /// Collecting the slot id to enroll into.
    EnrollIdEntry,

    /// Collecting the slot id to delete.
    DeleteIdEntry,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_str = match self {
            Mode::Idle => "Idle",
            Mode::AdminAuthenticating => "AdminAuthenticating",
            Mode::AdminMenu => "AdminMenu",
            Mode::EnrollIdEntry => "EnrollIdEntry",
            Mode::DeleteIdEntry => "DeleteIdEntry",
        };
        write!(f, "{}", mode_str)
    }
}

impl Mode {
    /// Check if a transition to `target` is allowed from this mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_controller::Mode;
    ///
    /// assert!(Mode::Idle.can_transition_to(&Mode::AdminAuthenticating));
    /// assert!(!Mode::Idle.can_transition_to(&Mode::AdminMenu));
    /// ```
    pub fn can_transition_to(&self, target: &Mode) -> bool {
        matches!(
            (self, target),
            (Mode::Idle, Mode::AdminAuthenticating)
                | (Mode::AdminAuthenticating, Mode::AdminMenu | Mode::Idle)
                | (
                    Mode::AdminMenu,
                    Mode::EnrollIdEntry | Mode::DeleteIdEntry | Mode::Idle
                )
                | (Mode::EnrollIdEntry | Mode::DeleteIdEntry, Mode::AdminMenu)
        )
    }

    /// Whether the verification protocol runs in this mode.
    pub fn polls_sensor(&self) -> bool {
        matches!(self, Mode::Idle)
    }
}

/// A single recorded mode change.
///
/// The `timestamp` is process-local and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeTransition {
    /// The mode left.
    pub from: Mode,

    /// The mode entered.
    pub to: Mode,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl ModeTransition {
    /// Create a transition record stamped now.
    pub fn new(from: Mode, to: Mode) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Tracks the current mode and a bounded history of transitions.
///
/// Every change goes through [`ModeTracker::transition_to`], which rejects
/// edges outside the transition table.
#[derive(Debug, Clone)]
pub struct ModeTracker {
    /// Current mode.
    current_mode: Mode,

    /// Recent transitions, oldest first (limited to MAX_HISTORY_SIZE).
    history: VecDeque<ModeTransition>,
}

impl ModeTracker {
    /// Create a tracker in `Idle` with empty history.
    pub fn new() -> Self {
        Self {
            current_mode: Mode::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// The current mode.
    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<ModeTransition> {
        &self.history
    }

    /// Move to `new_mode`, validating the edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the edge is not in the
    /// transition table. The tracker is left unchanged.
    pub fn transition_to(&mut self, new_mode: Mode) -> Result<ModeTransition> {
        if !self.current_mode.can_transition_to(&new_mode) {
            return Err(Error::InvalidStateTransition {
                from: self.current_mode.to_string(),
                to: new_mode.to_string(),
            });
        }

        let transition = ModeTransition::new(self.current_mode, new_mode);

        self.current_mode = new_mode;
        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for ModeTracker {
    fn default() -> Self {
        Self::new()
    }
}
