//! The terminal controller.
//!
//! [`Controller`] owns the peripherals and the [`Session`], and runs the
//! polling cycle:
//!
//! 1. take at most one pending key and act on it
//! 2. if the terminal is `Idle`, run one verification step
//!
//! Key interpretation is delegated to [`Session::apply`]; this module turns
//! the resulting [`Action`] into screens, indicator states, holds and
//! protocol runs.
//!
//! # Examples
//!
//! ```
//! use bioterm_controller::{Controller, Mode, Peripherals, RecordingHost, VirtualDisplay};
//! use bioterm_core::{SlotId, TerminalConfig};
//! use bioterm_hardware::ChannelKeypad;
//! use bioterm_hardware::mock::{Finger, MockIndicator, MockSensor};
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> bioterm_controller::Result<()> {
//!     let (sensor, fingers) = MockSensor::new();
//!     let (keypad, _keys) = ChannelKeypad::new();
//!     let slot = SlotId::new(7).unwrap();
//!     fingers.enroll(slot, Finger(1));
//!
//!     let mut controller = Controller::new(
//!         Peripherals {
//!             sensor,
//!             keypad,
//!             display: VirtualDisplay::default(),
//!             indicator: MockIndicator::new(),
//!             host: RecordingHost::new(),
//!         },
//!         &TerminalConfig::default(),
//!     );
//!
//!     controller.boot().await?;
//!     fingers.place_finger(Finger(1));
//!     controller.step().await?;
//!
//!     assert_eq!(controller.host().logins(), &[slot]);
//!     assert_eq!(controller.mode(), Mode::Idle);
//!     Ok(())
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use bioterm_core::constants::prompts;
use bioterm_core::{AdminPin, SlotId, TerminalConfig, Timing};
use bioterm_hardware::traits::{DisplaySink, IndicatorOutput, InputSource, SensorLink};
use bioterm_hardware::{Indicator, Key};

use crate::error::{ControllerError, Result};
use crate::host::HostChannel;
use crate::mode::{Mode, ModeTransition};
use crate::protocol::{self, EnrollError, EnrollReport, Enrollment, MatchResult, fail_pulse};
use crate::session::{Action, Session};

/// Coarse lifecycle of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created, sensor handshake not yet done.
    Booting,
    /// Handshake succeeded; the polling cycle may run.
    Running,
    /// Handshake failed. Permanent.
    Halted,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle_str = match self {
            Lifecycle::Booting => "Booting",
            Lifecycle::Running => "Running",
            Lifecycle::Halted => "Halted",
        };
        write!(f, "{}", lifecycle_str)
    }
}

/// The collaborators a controller drives.
#[derive(Debug)]
pub struct Peripherals<S, K, D, I, H> {
    pub sensor: S,
    pub keypad: K,
    pub display: D,
    pub indicator: I,
    pub host: H,
}

/// Biometric access terminal controller.
pub struct Controller<S, K, D, I, H> {
    sensor: S,
    keypad: K,
    display: D,
    indicator: I,
    host: H,
    session: Session,
    admin_pin: AdminPin,
    timing: Timing,
    lifecycle: Lifecycle,
}

impl<S, K, D, I, H> Controller<S, K, D, I, H>
where
    S: SensorLink,
    K: InputSource,
    D: DisplaySink,
    I: IndicatorOutput,
    H: HostChannel,
{
    /// Create a controller in `Booting`. Call [`boot`](Self::boot) next.
    pub fn new(peripherals: Peripherals<S, K, D, I, H>, config: &TerminalConfig) -> Self {
        let Peripherals {
            sensor,
            keypad,
            display,
            indicator,
            host,
        } = peripherals;

        Self {
            sensor,
            keypad,
            display,
            indicator,
            host,
            session: Session::new(),
            admin_pin: config.admin_pin.clone(),
            timing: config.timing.clone(),
            lifecycle: Lifecycle::Booting,
        }
    }

    /// Handshake with the sensor and enter `Idle`.
    ///
    /// Calling this on a running controller does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::SensorUnavailable`] if the handshake fails.
    /// The controller is then `Halted` and refuses every further operation.
    pub async fn boot(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Halted => return Err(ControllerError::NotRunning(Lifecycle::Halted)),
            Lifecycle::Booting => {}
        }

        self.indicator.set_indicator(Indicator::Neutral);
        self.show(prompts::BOOTING);

        if let Err(source) = self.sensor.verify_password().await {
            error!(error = %source, "Fingerprint sensor not found, halting");
            self.show(prompts::SENSOR_ERROR);
            self.lifecycle = Lifecycle::Halted;
            return Err(ControllerError::SensorUnavailable(source));
        }

        info!("Fingerprint sensor ready");
        self.show(prompts::SENSOR_OK);
        sleep(self.timing.boot_hold()).await;

        self.lifecycle = Lifecycle::Running;
        self.show_idle_prompt();
        Ok(())
    }

    /// Boot, then run the polling cycle until the keypad goes away.
    ///
    /// # Errors
    ///
    /// Returns the boot failure, [`ControllerError::InputClosed`] when the
    /// input source disconnects, or a host delivery failure.
    pub async fn run(&mut self) -> Result<()> {
        self.boot().await?;
        info!("Polling cycle started");

        loop {
            let busy = self.step().await?;
            if !busy {
                sleep(self.timing.idle_poll()).await;
            }
        }
    }

    /// Run one polling cycle.
    ///
    /// Returns `true` if a key was handled or a finger was seen, so callers
    /// can back off when nothing happened.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn step(&mut self) -> Result<bool> {
        self.ensure_running()?;

        let mut busy = false;
        if let Some(key) = self
            .keypad
            .try_read_key()
            .map_err(ControllerError::InputClosed)?
        {
            self.handle_key(key).await?;
            busy = true;
        }

        if self.session.mode().polls_sensor() {
            busy |= self.poll_sensor().await?.finger_present();
        }

        Ok(busy)
    }

    /// Interpret one key in the current mode and carry out what it triggers.
    ///
    /// # Errors
    ///
    /// Fails if the controller is not running.
    pub async fn handle_key(&mut self, key: Key) -> Result<()> {
        self.ensure_running()?;

        let from = self.session.mode();
        let action = self.session.apply(key, &self.admin_pin)?;
        trace!(%key, mode = %from, ?action, "Key handled");

        self.perform(action).await;
        Ok(())
    }

    /// Run one verification step and show the verdict.
    ///
    /// On a match the host is notified before any feedback is shown.
    ///
    /// # Errors
    ///
    /// Fails if the controller is not running or the host notification could
    /// not be written.
    pub async fn poll_sensor(&mut self) -> Result<MatchResult> {
        self.ensure_running()?;

        let result = protocol::identify(&mut self.sensor).await;
        match result {
            MatchResult::NoFinger => {}
            MatchResult::Matched(slot) => {
                info!(slot = %slot, "Access granted");
                self.host.login(slot)?;

                self.indicator.set_indicator(Indicator::Success);
                self.display
                    .show(prompts::ACCESS_GRANTED, &format!("ID: {slot}"));
                sleep(self.timing.granted_dwell()).await;
                self.indicator.set_indicator(Indicator::Neutral);
                self.show_idle_prompt();
            }
            MatchResult::NotMatched => {
                info!("Access denied");
                self.indicator.set_indicator(Indicator::Fail);
                self.show(prompts::ACCESS_DENIED);
                sleep(self.timing.denied_dwell()).await;
                self.indicator.set_indicator(Indicator::Neutral);
                self.show_idle_prompt();
            }
            MatchResult::Unreadable(_) => {
                self.show(prompts::CAPTURE_ERROR);
                fail_pulse(&mut self.indicator, self.timing.fail_pulse()).await;
                sleep(self.timing.error_hold()).await;
                self.show_idle_prompt();
            }
        }

        Ok(result)
    }

    /// Enroll a finger into `slot` and show the outcome.
    ///
    /// Overwrites whatever the slot held. Does not change the mode.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NotRunning`] before any sensor command if the
    /// terminal is not running, otherwise [`ControllerError::Enrollment`]
    /// naming the step that failed.
    pub async fn enroll(&mut self, slot: SlotId) -> Result<EnrollReport> {
        self.ensure_running()?;

        let outcome = Enrollment::new(
            slot,
            &mut self.sensor,
            &mut self.keypad,
            &mut self.display,
            &mut self.indicator,
            &self.timing,
        )
        .run()
        .await;

        match &outcome {
            Ok(report) => {
                self.indicator.set_indicator(Indicator::Success);
                self.display
                    .show(prompts::ENROLL_OK, &format!("ID {}", report.slot));
            }
            Err(EnrollError::Cancelled(step)) => {
                info!(slot = %slot, %step, "Enrollment cancelled");
                self.display.show(prompts::ENROLL_CANCELLED, "");
            }
            Err(e) => {
                warn!(slot = %slot, error = %e, "Enrollment failed");
                let detail = match e.sensor_code() {
                    Some(code) => format!("Code 0x{:02X}", code.to_u8()),
                    None => e.step().to_string(),
                };
                self.indicator.set_indicator(Indicator::Fail);
                self.display.show(prompts::ENROLL_FAILED, &detail);
            }
        }

        sleep(self.timing.result_hold()).await;
        self.indicator.set_indicator(Indicator::Neutral);
        outcome.map_err(ControllerError::from)
    }

    /// Delete the template in `slot` and show the outcome.
    ///
    /// Does not change the mode.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NotRunning`] before any sensor command if the
    /// terminal is not running, otherwise [`ControllerError::Deletion`] with
    /// whatever the store reported.
    pub async fn delete(&mut self, slot: SlotId) -> Result<()> {
        self.ensure_running()?;

        let outcome = protocol::delete(&mut self.sensor, slot).await;

        match &outcome {
            Ok(()) => self.display.show(prompts::DELETE_OK, &format!("ID {slot}")),
            Err(e) => {
                let detail = match e.sensor_code() {
                    Some(code) => format!("Code 0x{:02X}", code.to_u8()),
                    None => "No response".to_string(),
                };
                self.display.show(prompts::DELETE_ERROR, &detail);
            }
        }

        sleep(self.timing.result_hold()).await;
        outcome.map_err(|source| ControllerError::Deletion { slot, source })
    }

    async fn perform(&mut self, action: Action) {
        match action {
            Action::Ignored => {}
            Action::PromptPin => self.display.show(prompts::ENTER_PIN, ""),
            Action::EchoMasked { column } => self.display.write_at(1, column, "*"),
            Action::EchoDigit { column, digit } => {
                self.display.write_at(1, column, &digit.to_string())
            }
            Action::PinAccepted => {
                info!("Admin PIN accepted");
                self.display.show(prompts::PIN_OK, "");
                sleep(self.timing.pin_ok_hold()).await;
                self.show(prompts::MENU);
            }
            Action::PinRejected => {
                warn!("Wrong admin PIN");
                self.display.show(prompts::WRONG_PIN, "");
                fail_pulse(&mut self.indicator, self.timing.fail_pulse()).await;
                sleep(self.timing.notice_hold()).await;
                self.show_idle_prompt();
            }
            Action::ExitToIdle => {
                debug!("Leaving administration");
                self.show_idle_prompt();
            }
            Action::PromptEnrollId => self.show(prompts::ENROLL_ID),
            Action::PromptDeleteId => self.show(prompts::DELETE_ID),
            Action::BadId => {
                debug!("Rejected slot id");
                self.show(prompts::BAD_ID);
                fail_pulse(&mut self.indicator, self.timing.fail_pulse()).await;
                sleep(self.timing.notice_hold()).await;
                self.show(prompts::MENU);
            }
            Action::Enroll(slot) => {
                // Outcome is already logged and shown.
                let _ = self.enroll(slot).await;
                self.show(prompts::MENU);
            }
            Action::Delete(slot) => {
                let _ = self.delete(slot).await;
                self.show(prompts::MENU);
            }
            Action::BackToMenu => self.show(prompts::MENU),
        }
    }

    fn show(&mut self, (top, bottom): (&str, &str)) {
        self.display.show(top, bottom);
    }

    fn show_idle_prompt(&mut self) {
        self.display.show(prompts::PLACE_FINGER, "");
    }

    fn ensure_running(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Running => Ok(()),
            other => Err(ControllerError::NotRunning(other)),
        }
    }
}

impl<S, K, D, I, H> Controller<S, K, D, I, H> {
    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mode transitions so far, oldest first.
    pub fn history(&self) -> Vec<ModeTransition> {
        self.session.tracker().history().iter().cloned().collect()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Give the peripherals back.
    pub fn into_peripherals(self) -> Peripherals<S, K, D, I, H> {
        Peripherals {
            sensor: self.sensor,
            keypad: self.keypad,
            display: self.display,
            indicator: self.indicator,
            host: self.host,
        }
    }
}

impl<S, K, D, I, H> fmt::Debug for Controller<S, K, D, I, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("lifecycle", &self.lifecycle)
            .field("mode", &self.session.mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordingHost, VirtualDisplay};
    use bioterm_hardware::mock::{
        Capture, Finger, MockIndicator, MockSensor, MockSensorHandle, SensorCall,
    };
    use bioterm_hardware::{ChannelKeypad, ChannelKeypadHandle, HardwareError, SensorCode};

    type TestController =
        Controller<MockSensor, ChannelKeypad, VirtualDisplay, MockIndicator, RecordingHost>;

    fn controller() -> (TestController, MockSensorHandle, ChannelKeypadHandle) {
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
            &TerminalConfig::default(),
        );
        (controller, sensor_handle, keys)
    }

    async fn type_keys(controller: &mut TestController, legends: &str) {
        for key in legends.chars().filter_map(Key::from_char) {
            controller.handle_key(key).await.unwrap();
        }
    }

    fn slot(id: u8) -> SlotId {
        SlotId::new(id).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_success() {
        let (mut controller, sensor, _keys) = controller();
        controller.boot().await.unwrap();

        assert_eq!(controller.lifecycle(), Lifecycle::Running);
        assert_eq!(controller.mode(), Mode::Idle);
        assert_eq!(controller.display().text(0), "Place finger");
        assert!(controller.display().has_shown("Sensor OK"));
        assert_eq!(sensor.calls(), vec![SensorCall::VerifyPassword]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_failure_halts() {
        let (mut controller, sensor, _keys) = controller();
        sensor.set_online(false);

        let err = controller.boot().await.unwrap_err();
        assert!(matches!(err, ControllerError::SensorUnavailable(_)));
        assert!(err.is_fatal());
        assert_eq!(controller.lifecycle(), Lifecycle::Halted);
        assert_eq!(controller.display().text(0), "Sensor error");
        assert_eq!(controller.display().text(1), "Check wiring");

        // A halted terminal stays halted.
        sensor.set_online(true);
        assert!(controller.boot().await.is_err());
        assert!(matches!(
            controller.step().await,
            Err(ControllerError::NotRunning(Lifecycle::Halted))
        ));
        assert_eq!(sensor.count(SensorCall::CaptureImage), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operations_require_boot() {
        let (mut controller, _sensor, _keys) = controller();

        assert!(matches!(
            controller.handle_key(Key::Hash).await,
            Err(ControllerError::NotRunning(Lifecycle::Booting))
        ));
        assert!(controller.poll_sensor().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_notifies_host_and_shows_granted() {
        let (mut controller, sensor, _keys) = controller();
        sensor.enroll(slot(5), Finger(5));
        controller.boot().await.unwrap();

        sensor.push_capture(Capture::Finger(Finger(5)));
        let result = controller.poll_sensor().await.unwrap();

        assert_eq!(result, MatchResult::Matched(slot(5)));
        assert_eq!(controller.host().lines(), vec!["LOGIN:5"]);
        assert!(controller
            .display()
            .transcript()
            .iter()
            .any(|f| f.top == "Access Granted" && f.bottom == "ID: 5"));
        assert_eq!(
            controller.indicator().history(),
            &[Indicator::Neutral, Indicator::Success, Indicator::Neutral]
        );
        assert_eq!(controller.display().text(0), "Place finger");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_shows_denied() {
        let (mut controller, sensor, _keys) = controller();
        controller.boot().await.unwrap();

        sensor.push_capture(Capture::Finger(Finger(5)));
        let result = controller.poll_sensor().await.unwrap();

        assert_eq!(result, MatchResult::NotMatched);
        assert!(controller.host().logins().is_empty());
        assert!(controller.display().has_shown("Access Denied"));
        assert_eq!(controller.indicator().count(Indicator::Fail), 1);
        assert_eq!(controller.indicator().current(), Indicator::Neutral);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_finger_is_silent() {
        let (mut controller, _sensor, _keys) = controller();
        controller.boot().await.unwrap();
        let frames = controller.display().transcript().len();

        assert_eq!(controller.poll_sensor().await.unwrap(), MatchResult::NoFinger);
        assert_eq!(controller.display().transcript().len(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pin_flow_and_exit() {
        let (mut controller, _sensor, _keys) = controller();
        controller.boot().await.unwrap();

        type_keys(&mut controller, "#12").await;
        assert_eq!(controller.display().text(0), "Enter PIN:");
        assert_eq!(controller.display().text(1), "**");

        type_keys(&mut controller, "34*").await;
        assert_eq!(controller.mode(), Mode::AdminMenu);
        assert_eq!(controller.display().text(0), "1:Enroll 2:Del");

        type_keys(&mut controller, "0").await;
        assert_eq!(controller.mode(), Mode::Idle);
        assert_eq!(controller.display().text(0), "Place finger");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_pin_feedback() {
        let (mut controller, _sensor, _keys) = controller();
        controller.boot().await.unwrap();

        type_keys(&mut controller, "#0000*").await;

        assert_eq!(controller.mode(), Mode::Idle);
        assert!(controller.display().has_shown("Wrong PIN"));
        assert_eq!(controller.indicator().count(Indicator::Fail), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_from_menu() {
        let (mut controller, sensor, _keys) = controller();
        controller.boot().await.unwrap();
        sensor.script([
            Capture::Finger(Finger(3)),
            Capture::NoFinger,
            Capture::Finger(Finger(3)),
        ]);

        type_keys(&mut controller, "#1234*142*").await;

        assert_eq!(sensor.stored(slot(42)), Some(Finger(3)));
        assert!(controller.display().has_shown("Enroll OK"));
        assert_eq!(controller.mode(), Mode::AdminMenu);
        assert_eq!(controller.display().text(0), "1:Enroll 2:Del");
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_failure_shows_code() {
        let (mut controller, sensor, _keys) = controller();
        controller.boot().await.unwrap();
        sensor.script([
            Capture::Finger(Finger(3)),
            Capture::NoFinger,
            Capture::Finger(Finger(4)),
        ]);

        let err = controller.enroll(slot(8)).await.unwrap_err();

        let ControllerError::Enrollment(err) = err else {
            panic!("expected an enrollment error, got {err:?}");
        };
        assert_eq!(err.step(), protocol::EnrollStep::Merge);
        assert!(controller
            .display()
            .transcript()
            .iter()
            .any(|f| f.top == "Enroll failed" && f.bottom == "Code 0x0A"));
        assert_eq!(sensor.template_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_from_menu() {
        let (mut controller, sensor, _keys) = controller();
        sensor.enroll(slot(9), Finger(9));
        controller.boot().await.unwrap();

        type_keys(&mut controller, "#1234*29*").await;

        assert_eq!(sensor.stored(slot(9)), None);
        assert!(controller.display().has_shown("Delete OK"));
        assert_eq!(controller.mode(), Mode::AdminMenu);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_error_shown() {
        let (mut controller, _sensor, _keys) = controller();
        controller.boot().await.unwrap();

        let err = controller.delete(slot(9)).await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Deletion { source: HardwareError::Sensor(SensorCode::DeleteFail), .. }
        ));
        assert!(!err.is_fatal());
        assert_eq!(controller.display().last_frame().unwrap().top, "Delete error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_halted_terminal_refuses_admin_operations() {
        let (mut controller, sensor, _keys) = controller();
        sensor.enroll(slot(9), Finger(9));
        sensor.set_online(false);
        controller.boot().await.unwrap_err();
        sensor.set_online(true);
        sensor.place_finger(Finger(9));

        assert!(matches!(
            controller.delete(slot(9)).await,
            Err(ControllerError::NotRunning(Lifecycle::Halted))
        ));
        assert!(matches!(
            controller.enroll(slot(10)).await,
            Err(ControllerError::NotRunning(Lifecycle::Halted))
        ));

        assert_eq!(sensor.calls(), vec![SensorCall::VerifyPassword]);
        assert_eq!(sensor.stored(slot(9)), Some(Finger(9)));
        assert_eq!(controller.display().text(0), "Sensor error");
        assert_eq!(controller.display().text(1), "Check wiring");
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_ignores_sensor_outside_idle() {
        let (mut controller, sensor, keys) = controller();
        controller.boot().await.unwrap();
        sensor.place_finger(Finger(1));

        keys.press(Key::Hash).unwrap();
        controller.step().await.unwrap();

        assert_eq!(controller.mode(), Mode::AdminAuthenticating);
        assert_eq!(sensor.count(SensorCall::CaptureImage), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_reports_activity() {
        let (mut controller, sensor, keys) = controller();
        controller.boot().await.unwrap();

        assert!(!controller.step().await.unwrap());

        sensor.push_capture(Capture::Finger(Finger(1)));
        assert!(controller.step().await.unwrap());

        keys.press(Key::A).unwrap();
        assert!(controller.step().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ends_when_keypad_closes() {
        let (mut controller, _sensor, keys) = controller();
        drop(keys);

        let err = controller.run().await.unwrap_err();
        assert!(matches!(err, ControllerError::InputClosed(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_lifecycle_display() {
        assert_eq!(Lifecycle::Halted.to_string(), "Halted");
        let json = serde_json::to_string(&Lifecycle::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
