//! Console input: keypad legends and simulator commands read from stdin.
//!
//! Every line is either a run of key legends (`#1234*`) or, starting with
//! `:`, a command for the simulated sensor:
//!
//! | Line          | Effect                                  |
//! |---------------|-----------------------------------------|
//! | `:finger N`   | rest finger `N` on the sensor           |
//! | `:lift`       | lift the finger                         |
//! | `:noise`      | the next capture is a messy image       |
//! | `:enrolled`   | list occupied template pages            |

use std::io::BufRead;

use bioterm_core::SlotId;
use bioterm_hardware::mock::{Capture, Finger, MockSensorHandle};
use bioterm_hardware::{ChannelKeypadHandle, Key, SensorCode};
use tracing::{info, warn};

/// Slots seeded into the simulated library, each holding `Finger(id)`.
pub const SEEDED_SLOTS: [u8; 3] = [1, 2, 3];

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Keys(Vec<Key>),
    Finger(u32),
    Lift,
    Noise,
    Enrolled,
}

/// Parse one line of console input. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        return line
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Key::from_char(c).ok_or_else(|| format!("No key labelled {c:?}")))
            .collect::<Result<Vec<_>, _>>()
            .map(|keys| Some(ConsoleInput::Keys(keys)));
    };

    let mut words = command.split_whitespace();
    let input = match (words.next(), words.next(), words.next()) {
        (Some("finger"), Some(n), None) => n
            .parse()
            .map(ConsoleInput::Finger)
            .map_err(|_| format!("Bad finger number: {n}"))?,
        (Some("lift"), None, _) => ConsoleInput::Lift,
        (Some("noise"), None, _) => ConsoleInput::Noise,
        (Some("enrolled"), None, _) => ConsoleInput::Enrolled,
        _ => return Err(format!("Unknown command: {line}")),
    };
    Ok(Some(input))
}

/// Populate the simulated template library.
pub fn seed(sensor: &MockSensorHandle) {
    for id in SEEDED_SLOTS {
        if let Ok(slot) = SlotId::new(id) {
            sensor.enroll(slot, Finger(u32::from(id)));
        }
    }
    info!(slots = ?SEEDED_SLOTS, "Seeded simulated template library");
}

/// Feed stdin into the keypad (and the simulated sensor, if any) until EOF.
///
/// Runs on a plain thread. Returning drops the keypad handle, which the
/// controller sees as the input source closing.
pub fn pump_stdin(keys: ChannelKeypadHandle, sensor: Option<MockSensorHandle>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };

        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                warn!("{message}");
                continue;
            }
        };

        match (input, sensor.as_ref()) {
            (ConsoleInput::Keys(pressed), _) => {
                if keys.press_all(pressed).is_err() {
                    break;
                }
            }
            (ConsoleInput::Finger(n), Some(sensor)) => sensor.place_finger(Finger(n)),
            (ConsoleInput::Lift, Some(sensor)) => sensor.lift_finger(),
            (ConsoleInput::Noise, Some(sensor)) => {
                sensor.push_capture(Capture::Error(SensorCode::ImageMessy));
            }
            (ConsoleInput::Enrolled, Some(sensor)) => {
                info!(pages = ?sensor.occupied(), "Enrolled templates");
            }
            (_, None) => warn!("Sensor commands need --simulate"),
        }
    }
    info!("Console input closed");
}
