//! Core constants for the biometric terminal.
//!
//! This module centralizes the fixed limits, default timings, and prompt texts
//! used by the controller. Prompts are plain ASCII and sized for a 16-column
//! character LCD.
//!
//! # Usage
//!
//! ```
//! use bioterm_core::constants::*;
//!
//! fn is_valid_slot(id: u32) -> bool {
//!     (MIN_SLOT_ID as u32..=MAX_SLOT_ID as u32).contains(&id)
//! }
//!
//! assert!(is_valid_slot(127));
//! assert!(!is_valid_slot(0));
//! ```

// ============================================================================
// Template Slots
// ============================================================================

/// Lowest addressable template slot.
pub const MIN_SLOT_ID: u8 = 1;

/// Highest addressable template slot.
///
/// The sensor module may hold more pages than this; the terminal only ever
/// addresses `MIN_SLOT_ID..=MAX_SLOT_ID`.
pub const MAX_SLOT_ID: u8 = 127;

// ============================================================================
// Entry Buffers
// ============================================================================

/// Length of the administrative PIN, and capacity of the PIN entry buffer.
pub const PIN_LENGTH: usize = 4;

/// Capacity of the slot id entry buffer (three decimal digits).
pub const ID_BUFFER_LENGTH: usize = 3;

/// PIN accepted when no configuration overrides it.
pub const DEFAULT_ADMIN_PIN: &str = "1234";

// ============================================================================
// Default Timings (milliseconds)
// ============================================================================

/// How long "Access Granted" stays on screen after a match.
pub const DEFAULT_GRANTED_DWELL_MS: u64 = 1500;

/// How long "Access Denied" stays on screen after a failed match.
pub const DEFAULT_DENIED_DWELL_MS: u64 = 1000;

/// How long "Error / Try again" stays on screen after a bad frame.
pub const DEFAULT_ERROR_HOLD_MS: u64 = 800;

/// Length of the fail indicator pulse (buzzer beep).
pub const DEFAULT_FAIL_PULSE_MS: u64 = 150;

/// Settle delay after asking the user to lift the finger during enrollment.
pub const DEFAULT_LIFT_SETTLE_MS: u64 = 2000;

/// Delay between capture attempts while waiting for a finger.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 50;

/// How long enrollment and deletion results stay on screen.
pub const DEFAULT_RESULT_HOLD_MS: u64 = 1500;

/// How long "Wrong PIN" and "Bad ID" notices stay on screen.
pub const DEFAULT_NOTICE_HOLD_MS: u64 = 1000;

/// How long "PIN OK" stays on screen before the admin menu.
pub const DEFAULT_PIN_OK_HOLD_MS: u64 = 800;

/// How long the boot banner stays on screen after the sensor handshake.
pub const DEFAULT_BOOT_HOLD_MS: u64 = 1000;

/// Pause between idle polling cycles.
pub const DEFAULT_IDLE_POLL_MS: u64 = 20;

/// Upper bound for a single enrollment wait. Zero disables the bound.
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// Display
// ============================================================================

/// Number of lines on the terminal LCD.
pub const DISPLAY_LINES: usize = 2;

/// Number of characters per LCD line.
pub const DISPLAY_COLUMNS: usize = 16;

// ============================================================================
// Sensor Link
// ============================================================================

/// Serial baud rate of the fingerprint module.
pub const DEFAULT_SENSOR_BAUD: u32 = 57_600;

/// Broadcast module address.
pub const DEFAULT_SENSOR_ADDRESS: u32 = 0xFFFF_FFFF;

/// Factory handshake password.
pub const DEFAULT_SENSOR_PASSWORD: u32 = 0;

/// Number of template pages searched by a fast search.
pub const DEFAULT_SENSOR_CAPACITY: u16 = 163;

// ============================================================================
// Prompts
// ============================================================================

/// Prompt texts shown on the display, grouped as `(top, bottom)` pairs where
/// both lines are fixed.
pub mod prompts {
    pub const PLACE_FINGER: &str = "Place finger";
    pub const BOOTING: (&str, &str) = ("Fingerprint", "Starting...");
    pub const SENSOR_OK: (&str, &str) = ("Sensor OK", "Ready...");
    pub const SENSOR_ERROR: (&str, &str) = ("Sensor error", "Check wiring");
    pub const ENTER_PIN: &str = "Enter PIN:";
    pub const PIN_OK: &str = "PIN OK";
    pub const WRONG_PIN: &str = "Wrong PIN";
    pub const MENU: (&str, &str) = ("1:Enroll 2:Del", "0:Exit");
    pub const ENROLL_ID: (&str, &str) = ("Enroll ID:", "Type & *");
    pub const DELETE_ID: (&str, &str) = ("Delete ID:", "Type & *");
    pub const BAD_ID: (&str, &str) = ("Bad ID", "1..127");
    pub const CAPTURE_ERROR: (&str, &str) = ("Error", "Try again");
    pub const ACCESS_GRANTED: &str = "Access Granted";
    pub const ACCESS_DENIED: (&str, &str) = ("Access Denied", "Wrong finger");
    pub const REMOVE_FINGER: &str = "Remove finger";
    pub const SAME_FINGER: (&str, &str) = ("Same finger", "again");
    pub const ENROLL_OK: &str = "Enroll OK";
    pub const ENROLL_FAILED: &str = "Enroll failed";
    pub const ENROLL_CANCELLED: &str = "Enroll cancelled";
    pub const DELETE_OK: &str = "Delete OK";
    pub const DELETE_ERROR: &str = "Delete error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range_fits_id_buffer() {
        assert_eq!(MAX_SLOT_ID.to_string().len(), ID_BUFFER_LENGTH);
        assert!(MIN_SLOT_ID > 0);
    }

    #[test]
    fn test_default_pin_length() {
        assert_eq!(DEFAULT_ADMIN_PIN.len(), PIN_LENGTH);
        assert!(DEFAULT_ADMIN_PIN.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_prompts_fit_display() {
        let fixed = [
            prompts::PLACE_FINGER,
            prompts::ENTER_PIN,
            prompts::PIN_OK,
            prompts::WRONG_PIN,
            prompts::ACCESS_GRANTED,
            prompts::REMOVE_FINGER,
            prompts::ENROLL_OK,
            prompts::ENROLL_FAILED,
            prompts::ENROLL_CANCELLED,
            prompts::DELETE_OK,
            prompts::DELETE_ERROR,
        ];
        let pairs = [
            prompts::BOOTING,
            prompts::SENSOR_OK,
            prompts::SENSOR_ERROR,
            prompts::MENU,
            prompts::ENROLL_ID,
            prompts::DELETE_ID,
            prompts::BAD_ID,
            prompts::CAPTURE_ERROR,
            prompts::ACCESS_DENIED,
            prompts::SAME_FINGER,
        ];

        for text in fixed.into_iter().chain(pairs.into_iter().flat_map(|(a, b)| [a, b])) {
            assert!(text.is_ascii(), "{text}");
            assert!(text.len() <= DISPLAY_COLUMNS, "{text}");
        }
    }

    #[test]
    fn test_sensor_capacity_covers_slots() {
        assert!(DEFAULT_SENSOR_CAPACITY >= MAX_SLOT_ID as u16);
    }
}
