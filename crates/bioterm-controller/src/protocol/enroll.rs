//! Enrollment: two captures of the same finger, merged and stored in a slot.
//!
//! The protocol is a sequence of fallible steps composed with `?`:
//!
//! 1. [`EnrollStep::FirstCapture`]: wait for a finger, convert into buffer 1
//! 2. [`EnrollStep::AwaitLift`]: settle, then wait until the finger is gone
//! 3. [`EnrollStep::SecondCapture`]: wait for a finger, convert into buffer 2
//! 4. [`EnrollStep::Merge`]: build a model from both buffers
//! 5. [`EnrollStep::Store`]: write the model to the slot
//!
//! The three waits are the only unbounded phases. Each one is raced against a
//! `#` from the keypad (cancel) and the optional capture timeout, so an
//! administrator can always walk away from a half-finished enrollment.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use bioterm_core::constants::prompts;
use bioterm_core::{CharBuffer, SlotId, Timing};
use bioterm_hardware::traits::{DisplaySink, IndicatorOutput, InputSource, SensorLink};
use bioterm_hardware::{HardwareError, Key, SensorCode};

use super::fail_pulse;

/// A step of the enrollment protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollStep {
    FirstCapture,
    AwaitLift,
    SecondCapture,
    Merge,
    Store,
}

impl fmt::Display for EnrollStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step_str = match self {
            EnrollStep::FirstCapture => "first capture",
            EnrollStep::AwaitLift => "finger lift",
            EnrollStep::SecondCapture => "second capture",
            EnrollStep::Merge => "merge",
            EnrollStep::Store => "store",
        };
        write!(f, "{}", step_str)
    }
}

/// Why an enrollment stopped before the template was stored.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    /// `#` was pressed while waiting.
    #[error("Enrollment cancelled during {0}")]
    Cancelled(EnrollStep),

    /// The capture timeout elapsed while waiting.
    #[error("Enrollment timed out during {step} after {waited_ms}ms")]
    TimedOut { step: EnrollStep, waited_ms: u64 },

    /// The sensor rejected a step or the link failed.
    #[error("Enrollment {step} failed: {source}")]
    Sensor {
        step: EnrollStep,
        #[source]
        source: HardwareError,
    },
}

impl EnrollError {
    /// The step the enrollment stopped in.
    pub fn step(&self) -> EnrollStep {
        match self {
            EnrollError::Cancelled(step) => *step,
            EnrollError::TimedOut { step, .. } => *step,
            EnrollError::Sensor { step, .. } => *step,
        }
    }

    /// The sensor confirmation code, if the module reported one.
    pub fn sensor_code(&self) -> Option<SensorCode> {
        match self {
            EnrollError::Sensor { source, .. } => source.sensor_code(),
            _ => None,
        }
    }

    fn sensor(step: EnrollStep) -> impl FnOnce(HardwareError) -> Self {
        move |source| EnrollError::Sensor { step, source }
    }
}

/// Summary of a completed enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollReport {
    /// Slot the template was stored in.
    pub slot: SlotId,
    /// Captures that returned an error code and were retried.
    pub failed_captures: u32,
}

/// One enrollment run, borrowing the peripherals it needs.
///
/// # Examples
///
/// ```
/// use bioterm_controller::VirtualDisplay;
/// use bioterm_controller::protocol::Enrollment;
/// use bioterm_core::{SlotId, Timing};
/// use bioterm_hardware::ChannelKeypad;
/// use bioterm_hardware::mock::{Capture, Finger, MockIndicator, MockSensor};
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() {
///     let (mut sensor, handle) = MockSensor::new();
///     let (mut keypad, _keys) = ChannelKeypad::new();
///     let mut display = VirtualDisplay::default();
///     let mut indicator = MockIndicator::new();
///     let timing = Timing::default();
///     let slot = SlotId::new(5).unwrap();
///
///     handle.script([
///         Capture::Finger(Finger(9)),
///         Capture::NoFinger,
///         Capture::Finger(Finger(9)),
///     ]);
///
///     let report = Enrollment::new(
///         slot, &mut sensor, &mut keypad, &mut display, &mut indicator, &timing,
///     )
///     .run()
///     .await
///     .unwrap();
///
///     assert_eq!(report.slot, slot);
///     assert_eq!(handle.stored(slot), Some(Finger(9)));
/// }
/// ```
pub struct Enrollment<'a, S, K, D, I> {
    slot: SlotId,
    sensor: &'a mut S,
    keypad: &'a mut K,
    display: &'a mut D,
    indicator: &'a mut I,
    timing: &'a Timing,
    failed_captures: u32,
}

impl<'a, S, K, D, I> Enrollment<'a, S, K, D, I>
where
    S: SensorLink,
    K: InputSource,
    D: DisplaySink,
    I: IndicatorOutput,
{
    pub fn new(
        slot: SlotId,
        sensor: &'a mut S,
        keypad: &'a mut K,
        display: &'a mut D,
        indicator: &'a mut I,
        timing: &'a Timing,
    ) -> Self {
        Self {
            slot,
            sensor,
            keypad,
            display,
            indicator,
            timing,
            failed_captures: 0,
        }
    }

    /// Run all five steps, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the step that failed and why. Nothing is stored unless every
    /// step succeeded.
    pub async fn run(mut self) -> Result<EnrollReport, EnrollError> {
        info!(slot = %self.slot, "Enrollment started");

        self.display
            .show(&format!("Enroll ID {}", self.slot), prompts::PLACE_FINGER);
        self.capture(EnrollStep::FirstCapture, CharBuffer::One).await?;
        debug!(slot = %self.slot, "First image converted");

        self.display.show(prompts::REMOVE_FINGER, "");
        self.await_lift().await?;

        let (top, bottom) = prompts::SAME_FINGER;
        self.display.show(top, bottom);
        self.capture(EnrollStep::SecondCapture, CharBuffer::Two).await?;
        debug!(slot = %self.slot, "Second image converted");

        self.merge().await?;
        self.store().await?;

        info!(slot = %self.slot, failed_captures = self.failed_captures, "Enrollment stored");
        Ok(EnrollReport {
            slot: self.slot,
            failed_captures: self.failed_captures,
        })
    }

    /// Wait for a readable image, then convert it into `buffer`.
    async fn capture(&mut self, step: EnrollStep, buffer: CharBuffer) -> Result<(), EnrollError> {
        let wait = wait_for_image(
            &mut *self.sensor,
            &mut *self.indicator,
            self.timing,
            &mut self.failed_captures,
            step,
        );
        guard(&mut *self.keypad, self.timing.capture_timeout(), step, wait).await?;

        self.sensor
            .image_to_template(buffer)
            .await
            .map_err(EnrollError::sensor(step))
    }

    /// Give the operator time to lift, then wait until the sensor is clear.
    async fn await_lift(&mut self) -> Result<(), EnrollError> {
        let step = EnrollStep::AwaitLift;
        let settle = self.timing.lift_settle();
        let retry = self.timing.retry_interval();
        let sensor = &mut *self.sensor;

        let wait = async move {
            sleep(settle).await;
            loop {
                match sensor.capture_image().await {
                    Err(e) if e.is_no_finger() => return Ok(()),
                    Ok(()) => trace!("Finger still on sensor"),
                    Err(e) if e.sensor_code().is_some() => trace!(error = %e, "Waiting for lift"),
                    Err(e) => return Err(EnrollError::Sensor { step, source: e }),
                }
                sleep(retry).await;
            }
        };
        guard(&mut *self.keypad, self.timing.capture_timeout(), step, wait).await
    }

    async fn merge(&mut self) -> Result<(), EnrollError> {
        self.sensor
            .create_model()
            .await
            .map_err(EnrollError::sensor(EnrollStep::Merge))
    }

    async fn store(&mut self) -> Result<(), EnrollError> {
        self.sensor
            .store_model(self.slot, CharBuffer::One)
            .await
            .map_err(EnrollError::sensor(EnrollStep::Store))
    }
}

/// Poll until the sensor captures an image.
///
/// "No finger" waits a retry interval. Any other code pulses the fail
/// indicator, counts as a failed capture and is retried. A link failure ends
/// the wait.
async fn wait_for_image<S, I>(
    sensor: &mut S,
    indicator: &mut I,
    timing: &Timing,
    failed_captures: &mut u32,
    step: EnrollStep,
) -> Result<(), EnrollError>
where
    S: SensorLink,
    I: IndicatorOutput,
{
    loop {
        match sensor.capture_image().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_no_finger() => sleep(timing.retry_interval()).await,
            Err(e) if e.sensor_code().is_some() => {
                *failed_captures += 1;
                warn!(%step, attempt = *failed_captures, error = %e, "Capture failed, retrying");
                fail_pulse(indicator, timing.fail_pulse()).await;
            }
            Err(e) => return Err(EnrollError::Sensor { step, source: e }),
        }
    }
}

/// Race a wait against a `#` cancel and an optional time limit.
///
/// The cancel branch is polled first, so a `#` already queued wins over a
/// wait that would also complete.
async fn guard<K, T>(
    keypad: &mut K,
    limit: Option<Duration>,
    step: EnrollStep,
    wait: impl Future<Output = Result<T, EnrollError>>,
) -> Result<T, EnrollError>
where
    K: InputSource,
{
    let bounded = async {
        match limit {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                EnrollError::TimedOut {
                    step,
                    waited_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => wait.await,
        }
    };

    tokio::select! {
        biased;
        () = cancel_key(keypad) => {
            info!(%step, "Enrollment cancelled from keypad");
            Err(EnrollError::Cancelled(step))
        }
        result = bounded => result,
    }
}

/// Resolve on `#`. Other keys are consumed and dropped. A closed input
/// source never resolves, leaving the timeout as the only way out.
async fn cancel_key<K: InputSource>(keypad: &mut K) {
    loop {
        match keypad.read_key().await {
            Ok(Key::Hash) => return,
            Ok(key) => trace!(%key, "Key ignored during enrollment"),
            Err(e) => {
                debug!(error = %e, "Input closed; enrollment can no longer be cancelled");
                std::future::pending::<()>().await;
            }
        }
    }
}
