//! Verification: capture, convert, search.

use tracing::{debug, warn};

use bioterm_core::{CharBuffer, SlotId};
use bioterm_hardware::traits::SensorLink;
use bioterm_hardware::SensorCode;

/// Outcome of one verification polling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Nothing on the sensor.
    NoFinger,
    /// The finger matches the template in this slot.
    Matched(SlotId),
    /// A readable finger that matches nothing enrolled.
    NotMatched,
    /// The capture or feature extraction failed. `None` when the link to the
    /// module failed rather than the module reporting a code.
    Unreadable(Option<SensorCode>),
}

impl MatchResult {
    /// Whether this step saw a finger at all.
    pub fn finger_present(&self) -> bool {
        !matches!(self, MatchResult::NoFinger)
    }
}

/// Run one capture → convert → search exchange.
///
/// No display or indicator output happens here.
///
/// # Examples
///
/// ```
/// use bioterm_controller::protocol::{identify, MatchResult};
/// use bioterm_core::SlotId;
/// use bioterm_hardware::mock::{Finger, MockSensor};
///
/// #[tokio::main]
/// async fn main() {
///     let (mut sensor, handle) = MockSensor::new();
///     let slot = SlotId::new(3).unwrap();
///     handle.enroll(slot, Finger(42));
///
///     assert_eq!(identify(&mut sensor).await, MatchResult::NoFinger);
///
///     handle.place_finger(Finger(42));
///     assert_eq!(identify(&mut sensor).await, MatchResult::Matched(slot));
/// }
/// ```
pub async fn identify<S: SensorLink>(sensor: &mut S) -> MatchResult {
    match sensor.capture_image().await {
        Ok(()) => {}
        Err(e) if e.is_no_finger() => return MatchResult::NoFinger,
        Err(e) => {
            warn!(error = %e, "Fingerprint capture failed");
            return MatchResult::Unreadable(e.sensor_code());
        }
    }

    if let Err(e) = sensor.image_to_template(CharBuffer::One).await {
        warn!(error = %e, "Feature extraction failed");
        return MatchResult::Unreadable(e.sensor_code());
    }

    match sensor.fast_search(CharBuffer::One).await {
        Ok(hit) => match hit.slot() {
            Some(slot) => {
                debug!(slot = %slot, score = hit.score, "Template matched");
                MatchResult::Matched(slot)
            }
            None => {
                warn!(page = hit.page, score = hit.score, "Match in a page outside the slot range");
                MatchResult::NotMatched
            }
        },
        Err(e) => {
            if e.sensor_code() == Some(SensorCode::NotFound) {
                debug!("No matching template");
            } else {
                warn!(error = %e, "Template search failed");
            }
            MatchResult::NotMatched
        }
    }
}
