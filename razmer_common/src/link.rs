//! Frame hand-off between the formatting side and the serial link.
//!
//! - [`FrameSlot`] - double buffer: the producer publishes a finished line,
//!   the transmitter takes the newest one. A half-written line is never
//!   visible to the transmit side.
//! - [`FrameSink`] - where taken frames go (serial port, stdout, a test
//!   recorder).
//! - [`LineAssembler`] - receiver side: collects bytes into lines and
//!   swaps buffers on every `\n`.

use crate::format::Line;
use tracing::{trace, warn};

/// Double-buffered hand-off of formatted lines.
#[derive(Debug, Default)]
pub struct FrameSlot {
    buffers: [Line; 2],
    front: usize,
    pending: bool,
    published: u64,
    overwritten: u64,
}

impl FrameSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `line` in the back buffer and make it the front.
    ///
    /// A frame published before the previous one was taken replaces it.
    pub fn publish(&mut self, line: &Line) {
        let back = self.front ^ 1;
        self.buffers[back].clone_from(line);
        self.front = back;
        if self.pending {
            self.overwritten += 1;
        }
        self.pending = true;
        self.published += 1;
    }

    /// Newest unsent frame, if any. Marks it sent.
    pub fn take(&mut self) -> Option<&Line> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(&self.buffers[self.front])
    }

    /// Last published frame, sent or not.
    pub fn latest(&self) -> Option<&Line> {
        (self.published > 0).then(|| &self.buffers[self.front])
    }

    /// Whether a frame is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Frames published so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Frames replaced before they were taken.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }
}

/// Destination of transmitted frames.
pub trait FrameSink {
    /// Send one complete line.
    fn transmit(&mut self, line: &str);
}

impl FrameSink for Vec<String> {
    fn transmit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Receiver-side line framing with a double buffer.
///
/// Bytes are appended to the active buffer. On `\n` the line (terminator
/// included) is completed, the buffers swap, and the finished line stays
/// readable through [`take_message`](Self::take_message) while the next one
/// is collected. A line longer than the buffer is dropped up to the next
/// `\n`.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffers: [Line; 2],
    current: usize,
    complete: bool,
    discarding: bool,
    dropped: u64,
}

impl LineAssembler {
    /// Empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one received byte. Returns `true` when it completed a line.
    ///
    /// A non-ASCII byte marks the line as malformed; it is dropped up to the
    /// next `\n` like an oversized one.
    pub fn push_byte(&mut self, byte: u8) -> bool {
        if self.discarding {
            if byte == b'\n' {
                self.discarding = false;
                self.buffers[self.current].clear();
            }
            return false;
        }

        if !byte.is_ascii() {
            warn!("Non-ASCII byte {:#04x} received, dropping line", byte);
            self.drop_line(byte);
            return false;
        }

        let buffer = &mut self.buffers[self.current];
        if buffer.push(char::from(byte)).is_err() {
            warn!("Receive line overflow after {} bytes, dropping line", buffer.len());
            self.drop_line(byte);
            return false;
        }

        if byte == b'\n' {
            trace!("Line complete: {:?}", buffer.as_str());
            self.current ^= 1;
            self.buffers[self.current].clear();
            self.complete = true;
            return true;
        }
        false
    }

    /// Discard the active line. `byte` is the one that was rejected; unless
    /// it is the terminator, the rest of the line is skipped too.
    fn drop_line(&mut self, byte: u8) {
        self.buffers[self.current].clear();
        self.dropped += 1;
        self.discarding = byte != b'\n';
    }

    /// Feed a run of bytes. Returns the number of lines completed.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| self.push_byte(b)).count()
    }

    /// Last completed line, once. Valid until the next call.
    pub fn take_message(&mut self) -> Option<&str> {
        if !self.complete {
            return None;
        }
        self.complete = false;
        Some(self.buffers[self.current ^ 1].as_str())
    }

    /// Lines dropped because they did not fit.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
