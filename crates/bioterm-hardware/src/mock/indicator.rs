//! Mock pass/fail indicators that remember every state they were driven to.

use crate::{Indicator, traits::IndicatorOutput};

/// Mock indicator bank (LEDs and buzzer).
///
/// # Examples
///
/// ```
/// use bioterm_hardware::mock::MockIndicator;
/// use bioterm_hardware::traits::IndicatorOutput;
/// use bioterm_hardware::Indicator;
///
/// let mut leds = MockIndicator::new();
/// leds.set_indicator(Indicator::Fail);
/// leds.set_indicator(Indicator::Neutral);
///
/// assert_eq!(leds.current(), Indicator::Neutral);
/// assert_eq!(leds.count(Indicator::Fail), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockIndicator {
    current: Indicator,
    history: Vec<Indicator>,
}

impl MockIndicator {
    /// Create an indicator bank with everything off.
    pub fn new() -> Self {
        Self {
            current: Indicator::Neutral,
            history: Vec::new(),
        }
    }

    /// The state most recently driven.
    pub fn current(&self) -> Indicator {
        self.current
    }

    /// Every state driven so far, oldest first.
    pub fn history(&self) -> &[Indicator] {
        &self.history
    }

    /// How many times a state was driven.
    pub fn count(&self, state: Indicator) -> usize {
        self.history.iter().filter(|s| **s == state).count()
    }

    /// Forget the recorded history, keeping the current state.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for MockIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorOutput for MockIndicator {
    fn set_indicator(&mut self, state: Indicator) {
        self.current = state;
        self.history.push(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_neutral_with_empty_history() {
        let leds = MockIndicator::default();
        assert_eq!(leds.current(), Indicator::Neutral);
        assert!(leds.history().is_empty());
    }

    #[test]
    fn test_records_history() {
        let mut leds = MockIndicator::new();
        leds.set_indicator(Indicator::Success);
        leds.set_indicator(Indicator::Neutral);
        leds.set_indicator(Indicator::Fail);

        assert_eq!(
            leds.history(),
            &[Indicator::Success, Indicator::Neutral, Indicator::Fail]
        );
        assert_eq!(leds.current(), Indicator::Fail);

        leds.clear_history();
        assert!(leds.history().is_empty());
        assert_eq!(leds.current(), Indicator::Fail);
    }
}
