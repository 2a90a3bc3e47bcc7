//! Host notification channel.
//!
//! The only thing that leaves the terminal is one line per successful match:
//!
//! ```text
//! LOGIN:<id>\n
//! ```
//!
//! with `<id>` in decimal, no padding.

use std::io::{self, Write};

use bioterm_core::SlotId;

/// Receiver of login notifications.
pub trait HostChannel {
    /// Announce a successful match.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the notification could not be delivered.
    fn login(&mut self, slot: SlotId) -> io::Result<()>;
}

/// Writes notifications as text lines to any writer, flushing each one.
///
/// # Examples
///
/// ```
/// use bioterm_controller::{HostChannel, LineHost};
/// use bioterm_core::SlotId;
///
/// let mut host = LineHost::new(Vec::new());
/// host.login(SlotId::new(7).unwrap()).unwrap();
/// assert_eq!(host.get_ref(), b"LOGIN:7\n");
/// ```
#[derive(Debug)]
pub struct LineHost<W> {
    writer: W,
}

impl<W: Write> LineHost<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostChannel for LineHost<W> {
    fn login(&mut self, slot: SlotId) -> io::Result<()> {
        writeln!(self.writer, "LOGIN:{slot}")?;
        self.writer.flush()
    }
}

impl<T: HostChannel + ?Sized> HostChannel for &mut T {
    fn login(&mut self, slot: SlotId) -> io::Result<()> {
        (**self).login(slot)
    }
}

/// Host that records notifications in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    logins: Vec<SlotId>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots announced so far, in order.
    pub fn logins(&self) -> &[SlotId] {
        &self.logins
    }

    /// The notifications as they would appear on the wire.
    pub fn lines(&self) -> Vec<String> {
        self.logins.iter().map(|slot| format!("LOGIN:{slot}")).collect()
    }
}

impl HostChannel for RecordingHost {
    fn login(&mut self, slot: SlotId) -> io::Result<()> {
        self.logins.push(slot);
        Ok(())
    }
}
