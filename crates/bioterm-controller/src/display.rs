//! Virtual character LCD.
//!
//! A 2-line × 16-column buffer that behaves like the terminal's HD44780-style
//! display: [`show`](DisplaySink::show) clears and writes both lines,
//! [`write_at`](DisplaySink::write_at) overwrites in place (used to echo PIN
//! and id digits). Every `show` is also appended to a transcript, so tests
//! and the console front-end can see which screens were presented.
//!
//! # Character Set
//!
//! The glass only renders printable ASCII (0x20-0x7E). Anything else is
//! replaced with `?` and control characters are dropped.
//!
//! # Examples
//!
//! ```
//! use bioterm_controller::VirtualDisplay;
//! use bioterm_hardware::traits::DisplaySink;
//!
//! let mut display = VirtualDisplay::new(2, 16);
//! display.show("Enter PIN:", "");
//! display.write_at(1, 0, "*");
//! display.write_at(1, 1, "*");
//!
//! assert_eq!(display.text(0), "Enter PIN:");
//! assert_eq!(display.text(1), "**");
//! ```

use bioterm_core::constants::{DISPLAY_COLUMNS, DISPLAY_LINES};
use bioterm_core::{DisplayConfig, Error, Result};
use bioterm_hardware::traits::DisplaySink;

/// One screen presented with [`DisplaySink::show`], trailing spaces removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub top: String,
    pub bottom: String,
}

impl Frame {
    /// Whether this frame shows `top` on the first line.
    pub fn is(&self, top: &str) -> bool {
        self.top == top
    }
}

/// Virtual character display.
///
/// Not thread-safe; the controller owns it exclusively.
#[derive(Debug, Clone)]
pub struct VirtualDisplay {
    /// Number of lines in the display.
    lines: usize,

    /// Number of columns per line.
    columns: usize,

    /// Current contents, each line exactly `columns` characters.
    buffer: Vec<String>,

    /// Screens presented so far, oldest first.
    transcript: Vec<Frame>,
}

impl VirtualDisplay {
    /// Create a blank display.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `lines` is zero.
    pub fn new(lines: usize, columns: usize) -> Self {
        debug_assert!(lines > 0, "Display needs at least one line");

        Self {
            lines,
            columns,
            buffer: vec![" ".repeat(columns); lines],
            transcript: Vec::new(),
        }
    }

    /// Create a display sized from configuration.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.lines, config.columns)
    }

    /// Replace a whole line. Text is sanitized and truncated to the width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if `line` is out of bounds.
    pub fn set_line(&mut self, line: usize, text: &str) -> Result<()> {
        self.check_line(line)?;
        self.buffer[line] = pad_text(&sanitize_text(text), self.columns);
        Ok(())
    }

    /// Overwrite text starting at a column, clipping at the right edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if `line` is out of bounds. A column past
    /// the right edge writes nothing.
    pub fn overwrite(&mut self, line: usize, col: usize, text: &str) -> Result<()> {
        self.check_line(line)?;

        let mut chars: Vec<char> = self.buffer[line].chars().collect();
        for (slot, c) in chars.iter_mut().skip(col).zip(sanitize_text(text).chars()) {
            *slot = c;
        }
        self.buffer[line] = chars.into_iter().collect();
        Ok(())
    }

    /// Fill every line with spaces. The transcript is kept.
    pub fn clear(&mut self) {
        for line in &mut self.buffer {
            *line = " ".repeat(self.columns);
        }
    }

    /// Get a line padded to the column width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if `line` is out of bounds.
    pub fn get_line(&self, line: usize) -> Result<&str> {
        self.check_line(line)?;
        Ok(&self.buffer[line])
    }

    /// Get all lines padded to the column width.
    pub fn get_all_lines(&self) -> Vec<&str> {
        self.buffer.iter().map(|s| s.as_str()).collect()
    }

    /// A line without trailing padding; empty for an out-of-range line.
    pub fn text(&self, line: usize) -> &str {
        self.buffer.get(line).map_or("", |s| s.trim_end())
    }

    /// Screens presented so far, oldest first.
    pub fn transcript(&self) -> &[Frame] {
        &self.transcript
    }

    /// The most recently presented screen.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.transcript.last()
    }

    /// Whether a screen with `top` on the first line was ever presented.
    pub fn has_shown(&self, top: &str) -> bool {
        self.transcript.iter().any(|frame| frame.is(top))
    }

    /// Drop the transcript.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Render the glass as a framed block, one row per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_controller::VirtualDisplay;
    ///
    /// let display = VirtualDisplay::new(2, 4);
    /// assert_eq!(display.render(), "+----+\n|    |\n|    |\n+----+");
    /// ```
    pub fn render(&self) -> String {
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut rows = Vec::with_capacity(self.lines + 2);
        rows.push(border.clone());
        rows.extend(self.buffer.iter().map(|line| format!("|{line}|")));
        rows.push(border);
        rows.join("\n")
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line >= self.lines {
            return Err(Error::InvalidLine {
                line,
                max: self.lines - 1,
            });
        }
        Ok(())
    }
}

impl DisplaySink for VirtualDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        self.clear();
        // Line count is validated at configuration load, so both writes land.
        let _ = self.set_line(0, top);
        let _ = self.set_line(1, bottom);

        self.transcript.push(Frame {
            top: self.text(0).to_string(),
            bottom: self.text(1).to_string(),
        });
    }

    fn write_at(&mut self, row: usize, col: usize, text: &str) {
        let _ = self.overwrite(row, col, text);
    }
}

impl Default for VirtualDisplay {
    fn default() -> Self {
        Self::new(DISPLAY_LINES, DISPLAY_COLUMNS)
    }
}

/// Truncate text to a maximum number of characters.
///
/// # Examples
///
/// ```
/// use bioterm_controller::truncate_text;
///
/// assert_eq!(truncate_text("Access Granted!!!", 16), "Access Granted!!");
/// assert_eq!(truncate_text("Short", 10), "Short");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Left-align text in a fixed width, truncating or padding with spaces.
///
/// # Examples
///
/// ```
/// use bioterm_controller::pad_text;
///
/// assert_eq!(pad_text("ID: 7", 8), "ID: 7   ");
/// assert_eq!(pad_text("Remove finger", 6), "Remove");
/// ```
pub fn pad_text(text: &str, width: usize) -> String {
    let truncated = truncate_text(text, width);
    let padding = width - truncated.chars().count();
    format!("{}{}", truncated, " ".repeat(padding))
}

/// Drop control characters and replace anything outside printable ASCII.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
