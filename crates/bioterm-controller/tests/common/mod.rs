//! Common test utilities for controller integration tests.
//!
//! [`Terminal`] wires a controller to mock devices and keeps the handles
//! that steer them, so a test reads as a sequence of physical actions:
//! press keys, place a finger, run the polling cycle.

#![allow(dead_code)]

use bioterm_controller::{Controller, Mode, RecordingHost, VirtualDisplay, Peripherals};
use bioterm_core::{SlotId, TerminalConfig};
use bioterm_hardware::mock::{Capture, Finger, MockIndicator, MockSensor, MockSensorHandle};
use bioterm_hardware::{ChannelKeypad, ChannelKeypadHandle, Key};

pub type MockController =
    Controller<MockSensor, ChannelKeypad, VirtualDisplay, MockIndicator, RecordingHost>;

pub struct Terminal {
    pub controller: MockController,
    pub sensor: MockSensorHandle,
    pub keys: ChannelKeypadHandle,
}

impl Terminal {
    /// A terminal with default configuration, not yet booted.
    pub fn new() -> Self {
        Self::with_config(&TerminalConfig::default())
    }

    pub fn with_config(config: &TerminalConfig) -> Self {
        let (sensor, sensor_handle) = MockSensor::new();
        let (keypad, keys) = ChannelKeypad::new();
        let controller = Controller::new(
            Peripherals {
                sensor,
                keypad,
                display: VirtualDisplay::default(),
                indicator: MockIndicator::new(),
                host: RecordingHost::new(),
            },
            config,
        );

        Self {
            controller,
            sensor: sensor_handle,
            keys,
        }
    }

    /// A booted terminal in `Idle`.
    pub async fn booted() -> Self {
        let mut terminal = Self::new();
        terminal.controller.boot().await.unwrap();
        assert_eq!(terminal.controller.mode(), Mode::Idle);
        terminal
    }

    /// Feed keys straight into the controller, one at a time.
    pub async fn type_keys(&mut self, legends: &str) {
        for c in legends.chars() {
            let key = Key::from_char(c).unwrap();
            self.controller.handle_key(key).await.unwrap();
        }
    }

    /// Queue keys on the keypad and run one polling cycle per key.
    pub async fn press_and_step(&mut self, legends: &str) {
        for c in legends.chars() {
            self.keys.press(Key::from_char(c).unwrap()).unwrap();
            self.controller.step().await.unwrap();
        }
    }

    /// Script a clean two-capture enrollment of `finger`.
    pub fn script_enrollment(&self, finger: Finger) {
        self.sensor.script([
            Capture::Finger(finger),
            Capture::NoFinger,
            Capture::Finger(finger),
        ]);
    }

    pub fn host_lines(&self) -> Vec<String> {
        self.controller.host().lines()
    }

    pub fn display(&self) -> &VirtualDisplay {
        self.controller.display()
    }

    pub fn indicator(&self) -> &MockIndicator {
        self.controller.indicator()
    }

    /// How many times a screen with `top` on the first line was presented.
    pub fn times_shown(&self, top: &str) -> usize {
        self.display()
            .transcript()
            .iter()
            .filter(|frame| frame.is(top))
            .count()
    }
}

pub fn slot(id: u8) -> SlotId {
    SlotId::new(id).unwrap()
}
