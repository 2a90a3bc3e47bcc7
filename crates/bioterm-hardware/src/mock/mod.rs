//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod indicator;
pub mod sensor;

// Re-export commonly used types
pub use indicator::MockIndicator;
pub use sensor::{Capture, Finger, MockSensor, MockSensorHandle, SensorCall};
