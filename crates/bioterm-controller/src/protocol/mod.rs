//! Sensor protocols.
//!
//! Each protocol drives the [`SensorLink`](bioterm_hardware::traits::SensorLink)
//! through one multi-command exchange and reports a typed outcome. They
//! touch the display and indicators only where the exchange itself needs
//! operator feedback (enrollment prompts); the final verdict screens are
//! shown by the controller.

mod delete;
mod enroll;
mod verify;

pub use delete::delete;
pub use enroll::{EnrollError, EnrollReport, EnrollStep, Enrollment};
pub use verify::{MatchResult, identify};

use std::time::Duration;

use bioterm_hardware::Indicator;
use bioterm_hardware::traits::IndicatorOutput;

/// Light the fail indicator for `duration`, then return to neutral.
pub(crate) async fn fail_pulse<I: IndicatorOutput>(indicator: &mut I, duration: Duration) {
    indicator.set_indicator(Indicator::Fail);
    tokio::time::sleep(duration).await;
    indicator.set_indicator(Indicator::Neutral);
}
