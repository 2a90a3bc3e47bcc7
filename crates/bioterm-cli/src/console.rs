//! Terminal front panel drawn on stderr.

use std::io::{self, Write};

use bioterm_controller::VirtualDisplay;
use bioterm_core::DisplayConfig;
use bioterm_hardware::traits::{DisplaySink, IndicatorOutput};
use bioterm_hardware::Indicator;
use tracing::debug;

/// Display that redraws the glass on stderr after every change.
pub struct ConsoleDisplay {
    glass: VirtualDisplay,
}

impl ConsoleDisplay {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            glass: VirtualDisplay::from_config(config),
        }
    }

    fn redraw(&mut self) {
        // The transcript is only useful to tests; keep it from growing.
        self.glass.clear_transcript();
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{}", self.glass.render());
    }
}

impl DisplaySink for ConsoleDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        self.glass.show(top, bottom);
        self.redraw();
    }

    fn write_at(&mut self, row: usize, col: usize, text: &str) {
        self.glass.write_at(row, col, text);
        self.redraw();
    }
}

/// LED and buzzer state printed as a one-line status.
#[derive(Default)]
pub struct ConsoleIndicator {
    current: Option<Indicator>,
}

impl IndicatorOutput for ConsoleIndicator {
    fn set_indicator(&mut self, state: Indicator) {
        if self.current == Some(state) {
            return;
        }
        self.current = Some(state);
        debug!(?state, "Indicator");

        let label = match state {
            Indicator::Success => "[GREEN]",
            Indicator::Fail => "[RED + BEEP]",
            Indicator::Neutral => return,
        };
        let _ = writeln!(io::stderr().lock(), "{label}");
    }
}
