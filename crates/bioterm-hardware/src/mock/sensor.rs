//! Mock fingerprint module for testing and development.
//!
//! The mock keeps a template library keyed by page and models fingers as
//! plain numbers: two captures match when they came from the same [`Finger`].
//! What the sensor "sees" on each capture comes from a script of
//! [`Capture`] steps; once the script runs out, the finger currently resting
//! on the sensor (if any) is seen.

use crate::{HardwareError, Result, SearchHit, SensorCode, traits::SensorLink};
use bioterm_core::{CharBuffer, SlotId};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity of a simulated finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Finger(pub u32);

/// What a single `capture_image` call observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// A readable image of this finger.
    Finger(Finger),
    /// Nothing on the sensor.
    NoFinger,
    /// A bad frame reported with this code.
    Error(SensorCode),
}

/// Commands received by the mock, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCall {
    VerifyPassword,
    CaptureImage,
    ImageToTemplate(CharBuffer),
    CreateModel,
    StoreModel(SlotId),
    DeleteModel(SlotId),
    FastSearch,
}

#[derive(Debug)]
struct SensorState {
    online: bool,
    script: VecDeque<Capture>,
    resting: Option<Finger>,
    image: Option<Finger>,
    buffers: [Option<Finger>; 2],
    library: BTreeMap<u16, Finger>,
    conversion_failures: VecDeque<SensorCode>,
    store_failures: VecDeque<SensorCode>,
    delete_empty_is_error: bool,
    calls: Vec<SensorCall>,
}

impl SensorState {
    fn new() -> Self {
        Self {
            online: true,
            script: VecDeque::new(),
            resting: None,
            image: None,
            buffers: [None, None],
            library: BTreeMap::new(),
            conversion_failures: VecDeque::new(),
            store_failures: VecDeque::new(),
            delete_empty_is_error: true,
            calls: Vec::new(),
        }
    }

    fn buffer_mut(&mut self, buffer: CharBuffer) -> &mut Option<Finger> {
        match buffer {
            CharBuffer::One => &mut self.buffers[0],
            CharBuffer::Two => &mut self.buffers[1],
        }
    }
}

fn lock(shared: &Mutex<SensorState>) -> MutexGuard<'_, SensorState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock fingerprint module.
///
/// # Examples
///
/// ```
/// use bioterm_core::{CharBuffer, SlotId};
/// use bioterm_hardware::mock::{Capture, Finger, MockSensor};
/// use bioterm_hardware::traits::SensorLink;
///
/// #[tokio::main]
/// async fn main() -> bioterm_hardware::Result<()> {
///     let (mut sensor, handle) = MockSensor::new();
///     handle.enroll(SlotId::new(3).unwrap(), Finger(42));
///     handle.push_capture(Capture::Finger(Finger(42)));
///
///     sensor.capture_image().await?;
///     sensor.image_to_template(CharBuffer::One).await?;
///     let hit = sensor.fast_search(CharBuffer::One).await?;
///     assert_eq!(hit.page, 3);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    shared: Arc<Mutex<SensorState>>,
    name: String,
}

impl MockSensor {
    /// Create a new mock sensor with the default name.
    pub fn new() -> (Self, MockSensorHandle) {
        Self::with_name("Mock Sensor".to_string())
    }

    /// Create a new mock sensor with a custom name.
    pub fn with_name(name: String) -> (Self, MockSensorHandle) {
        let shared = Arc::new(Mutex::new(SensorState::new()));
        let handle = MockSensorHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared, name }, handle)
    }

    /// Lock the state, record the call, and fail if the module is offline.
    fn begin(&self, call: SensorCall) -> Result<MutexGuard<'_, SensorState>> {
        let mut state = lock(&self.shared);
        state.calls.push(call);
        if !state.online {
            return Err(HardwareError::disconnected(&self.name));
        }
        Ok(state)
    }
}

impl SensorLink for MockSensor {
    async fn verify_password(&mut self) -> Result<()> {
        self.begin(SensorCall::VerifyPassword).map(drop)
    }

    async fn capture_image(&mut self) -> Result<()> {
        let mut state = self.begin(SensorCall::CaptureImage)?;
        let seen = match state.script.pop_front() {
            Some(capture) => capture,
            None => state.resting.map_or(Capture::NoFinger, Capture::Finger),
        };
        match seen {
            Capture::Finger(finger) => {
                state.image = Some(finger);
                Ok(())
            }
            Capture::NoFinger => Err(SensorCode::NoFinger.into()),
            Capture::Error(code) => Err(code.into()),
        }
    }

    async fn image_to_template(&mut self, buffer: CharBuffer) -> Result<()> {
        let mut state = self.begin(SensorCall::ImageToTemplate(buffer))?;
        if let Some(code) = state.conversion_failures.pop_front() {
            return Err(code.into());
        }
        let image = state.image.ok_or(SensorCode::FeatureFail)?;
        *state.buffer_mut(buffer) = Some(image);
        Ok(())
    }

    async fn create_model(&mut self) -> Result<()> {
        let mut state = self.begin(SensorCall::CreateModel)?;
        let buffers = state.buffers;
        match buffers {
            [Some(first), Some(second)] if first == second => {
                state.buffers = [Some(first), Some(first)];
                Ok(())
            }
            _ => Err(SensorCode::EnrollMismatch.into()),
        }
    }

    async fn store_model(&mut self, slot: SlotId, buffer: CharBuffer) -> Result<()> {
        let mut state = self.begin(SensorCall::StoreModel(slot))?;
        if let Some(code) = state.store_failures.pop_front() {
            return Err(code.into());
        }
        let model = state.buffer_mut(buffer).ok_or(SensorCode::FeatureFail)?;
        state.library.insert(slot.page(), model);
        Ok(())
    }

    async fn delete_model(&mut self, slot: SlotId) -> Result<()> {
        let mut state = self.begin(SensorCall::DeleteModel(slot))?;
        let removed = state.library.remove(&slot.page());
        if removed.is_none() && state.delete_empty_is_error {
            return Err(SensorCode::DeleteFail.into());
        }
        Ok(())
    }

    async fn fast_search(&mut self, buffer: CharBuffer) -> Result<SearchHit> {
        let mut state = self.begin(SensorCall::FastSearch)?;
        let sample = state.buffer_mut(buffer).ok_or(SensorCode::NotFound)?;
        state
            .library
            .iter()
            .find(|(_, finger)| **finger == sample)
            .map(|(&page, _)| SearchHit { page, score: 100 })
            .ok_or_else(|| SensorCode::NotFound.into())
    }
}

/// Handle for steering a mock sensor and inspecting its library.
///
/// Cloneable; every method is synchronous so it can be driven from tests and
/// from plain threads alike.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    shared: Arc<Mutex<SensorState>>,
}

impl MockSensorHandle {
    /// Queue what the next capture sees.
    pub fn push_capture(&self, capture: Capture) {
        lock(&self.shared).script.push_back(capture);
    }

    /// Queue a sequence of capture observations.
    pub fn script(&self, captures: impl IntoIterator<Item = Capture>) {
        lock(&self.shared).script.extend(captures);
    }

    /// Rest a finger on the sensor. Seen by every capture once the script is empty.
    pub fn place_finger(&self, finger: Finger) {
        lock(&self.shared).resting = Some(finger);
    }

    /// Lift the resting finger.
    pub fn lift_finger(&self) {
        lock(&self.shared).resting = None;
    }

    /// Make the next feature extraction fail with `code`.
    pub fn fail_next_conversion(&self, code: SensorCode) {
        lock(&self.shared).conversion_failures.push_back(code);
    }

    /// Make the next store fail with `code`.
    pub fn fail_next_store(&self, code: SensorCode) {
        lock(&self.shared).store_failures.push_back(code);
    }

    /// Choose whether deleting an empty slot reports `DeleteFail` (the default).
    pub fn set_delete_empty_is_error(&self, is_error: bool) {
        lock(&self.shared).delete_empty_is_error = is_error;
    }

    /// Take the module on or off line. Offline modules fail every command.
    pub fn set_online(&self, online: bool) {
        lock(&self.shared).online = online;
    }

    /// Put a template straight into the library.
    pub fn enroll(&self, slot: SlotId, finger: Finger) {
        lock(&self.shared).library.insert(slot.page(), finger);
    }

    /// The finger stored at a slot.
    pub fn stored(&self, slot: SlotId) -> Option<Finger> {
        lock(&self.shared).library.get(&slot.page()).copied()
    }

    /// Number of stored templates.
    pub fn template_count(&self) -> usize {
        lock(&self.shared).library.len()
    }

    /// Slots holding a template, in ascending order.
    pub fn occupied(&self) -> Vec<u16> {
        lock(&self.shared).library.keys().copied().collect()
    }

    /// Captures still queued in the script.
    pub fn pending_captures(&self) -> usize {
        lock(&self.shared).script.len()
    }

    /// Every command received so far.
    pub fn calls(&self) -> Vec<SensorCall> {
        lock(&self.shared).calls.clone()
    }

    /// How many times a command was received.
    pub fn count(&self, call: SensorCall) -> usize {
        lock(&self.shared).calls.iter().filter(|c| **c == call).count()
    }

    /// Forget the recorded commands.
    pub fn clear_calls(&self) {
        lock(&self.shared).calls.clear();
    }
}
