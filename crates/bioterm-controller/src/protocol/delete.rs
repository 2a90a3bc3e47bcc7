//! Deletion: one command, no retries.

use tracing::{info, warn};

use bioterm_core::SlotId;
use bioterm_hardware::Result;
use bioterm_hardware::traits::SensorLink;

/// Delete the template in `slot`.
///
/// Whatever the module answers is passed through: modules differ on whether
/// an empty slot is an error, and this does not try to tell the cases apart.
///
/// # Errors
///
/// Returns the module's code or the link failure.
pub async fn delete<S: SensorLink>(sensor: &mut S, slot: SlotId) -> Result<()> {
    match sensor.delete_model(slot).await {
        Ok(()) => {
            info!(slot = %slot, "Template deleted");
            Ok(())
        }
        Err(e) => {
            warn!(slot = %slot, error = %e, "Template deletion failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioterm_hardware::mock::{Finger, MockSensor, SensorCall};
    use bioterm_hardware::SensorCode;

    #[tokio::test]
    async fn test_delete_occupied_slot() {
        let (mut sensor, handle) = MockSensor::new();
        let slot = SlotId::new(40).unwrap();
        handle.enroll(slot, Finger(1));

        delete(&mut sensor, slot).await.unwrap();

        assert_eq!(handle.stored(slot), None);
        assert_eq!(handle.calls(), vec![SensorCall::DeleteModel(slot)]);
    }

    #[tokio::test]
    async fn test_delete_empty_slot_passes_code_through() {
        let (mut sensor, handle) = MockSensor::new();
        let slot = SlotId::new(40).unwrap();

        let err = delete(&mut sensor, slot).await.unwrap_err();
        assert_eq!(err.sensor_code(), Some(SensorCode::DeleteFail));

        handle.set_delete_empty_is_error(false);
        assert!(delete(&mut sensor, slot).await.is_ok());
    }
}
