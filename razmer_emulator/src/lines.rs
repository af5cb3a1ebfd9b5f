//! Discrete output lines of the readout connector.
//!
//! Two ports are driven:
//!
//! | Port   | Bits                       | Meaning                         |
//! |--------|----------------------------|---------------------------------|
//! | column | B0..B4 (0..4), A7 (5)      | strobe select, see [`BLines`]   |
//! | data   | W1, W2, W4, W8 (0..3), ER (4) | BCD digit and its error flag |
//!
//! The column port can be wired active-low; [`SimulatedLines`] models that
//! with its `invert` option (inverted value masked to the six line bits).

use bitflags::bitflags;
use heapless::Deque;
use tracing::trace;

bitflags! {
    /// Column select pattern.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BLines: u8 {
        /// Column strobe 0.
        const B0 = 0x01;
        /// Column strobe 1.
        const B1 = 0x02;
        /// Column strobe 2.
        const B2 = 0x04;
        /// Column strobe 3.
        const B3 = 0x08;
        /// Column strobe 4.
        const B4 = 0x10;
        /// Overflow phase address line.
        const A7 = 0x20;
    }
}

impl BLines {
    /// `B0` during the overflow phase.
    pub const A7B0: Self = Self::from_bits_truncate(0x21);
    /// `B1` during the overflow phase.
    pub const A7B1: Self = Self::from_bits_truncate(0x22);
    /// `B2` during the overflow phase.
    pub const A7B2: Self = Self::from_bits_truncate(0x24);
    /// `B3` during the overflow phase.
    pub const A7B3: Self = Self::from_bits_truncate(0x28);
    /// `B4` during the overflow phase.
    pub const A7B4: Self = Self::from_bits_truncate(0x30);

    /// Value on the port, optionally active-low.
    #[inline]
    pub const fn port_value(self, invert: bool) -> u8 {
        if invert {
            !self.bits() & Self::all().bits()
        } else {
            self.bits()
        }
    }
}

/// BCD value bits on the data port.
pub const DATA_SIGN_MASK: u8 = 0x0F;

/// Error flag bit on the data port.
pub const DATA_ERROR_BIT: u8 = 0x10;

/// Data port value for one digit.
#[inline]
pub const fn data_port_value(sign: u8, error: bool) -> u8 {
    (sign & DATA_SIGN_MASK) | if error { DATA_ERROR_BIT } else { 0 }
}

/// Sink for the scan sequencer's line changes.
pub trait OutputLines {
    /// Drive a column select pattern.
    fn set_columns(&mut self, lines: BLines);

    /// Put one digit and its error flag on the data lines.
    fn write_digit(&mut self, sign: u8, error: bool);
}

/// One recorded line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Column pattern driven.
    Columns(BLines),
    /// Digit written.
    Digit {
        /// BCD value.
        sign: u8,
        /// Error flag.
        error: bool,
    },
}

/// Recorded line changes kept by [`SimulatedLines`].
pub const LINE_HISTORY: usize = 64;

/// In-memory port model that remembers what was driven.
#[derive(Debug, Default)]
pub struct SimulatedLines {
    invert: bool,
    column_port: u8,
    data_port: u8,
    columns: BLines,
    history: Deque<LineEvent, LINE_HISTORY>,
    digits_written: u64,
    patterns_driven: u64,
}

impl SimulatedLines {
    /// Ports start at 0 (all lines inactive for active-high wiring).
    pub fn new(invert: bool) -> Self {
        Self {
            invert,
            ..Self::default()
        }
    }

    /// Whether the column port is active-low.
    pub fn inverted(&self) -> bool {
        self.invert
    }

    /// Last pattern driven, before inversion.
    pub fn columns(&self) -> BLines {
        self.columns
    }

    /// Raw column port value.
    pub fn column_port(&self) -> u8 {
        self.column_port
    }

    /// Raw data port value.
    pub fn data_port(&self) -> u8 {
        self.data_port
    }

    /// Most recent events, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &LineEvent> {
        self.history.iter()
    }

    /// Digits written since creation.
    pub fn digits_written(&self) -> u64 {
        self.digits_written
    }

    /// Column patterns driven since creation.
    pub fn patterns_driven(&self) -> u64 {
        self.patterns_driven
    }

    /// Forget the recorded events; counters keep running.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn record(&mut self, event: LineEvent) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(event);
    }
}

impl OutputLines for SimulatedLines {
    fn set_columns(&mut self, lines: BLines) {
        self.columns = lines;
        self.column_port = lines.port_value(self.invert);
        self.patterns_driven += 1;
        self.record(LineEvent::Columns(lines));
        trace!("Columns {:#04x} (port {:#04x})", lines.bits(), self.column_port);
    }

    fn write_digit(&mut self, sign: u8, error: bool) {
        self.data_port = data_port_value(sign, error);
        self.digits_written += 1;
        self.record(LineEvent::Digit { sign, error });
        trace!("Digit {} error={}", sign, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_patterns() {
        assert_eq!(BLines::A7B0, BLines::A7 | BLines::B0);
        assert_eq!(BLines::A7B4.bits(), 0x30);
        assert_eq!(BLines::all().bits(), 0x3F);
    }

    #[test]
    fn inverted_port_is_masked() {
        assert_eq!(BLines::B1.port_value(false), 0x02);
        assert_eq!(BLines::B1.port_value(true), 0x3D);
        assert_eq!(BLines::A7B0.port_value(true), 0x1E);
        assert_eq!(BLines::empty().port_value(true), 0x3F);
    }

    #[test]
    fn data_port_packs_error() {
        assert_eq!(data_port_value(7, false), 0x07);
        assert_eq!(data_port_value(9, true), 0x19);
        assert_eq!(data_port_value(0x3F, false), 0x0F);
    }

    #[test]
    fn simulated_lines_track_ports() {
        let mut lines = SimulatedLines::new(true);
        lines.set_columns(BLines::B2);
        lines.write_digit(5, true);

        assert_eq!(lines.columns(), BLines::B2);
        assert_eq!(lines.column_port(), 0x3B);
        assert_eq!(lines.data_port(), 0x15);
        assert_eq!(lines.patterns_driven(), 1);
        assert_eq!(lines.digits_written(), 1);

        let events: Vec<_> = lines.history().copied().collect();
        assert_eq!(
            events,
            vec![
                LineEvent::Columns(BLines::B2),
                LineEvent::Digit { sign: 5, error: true },
            ]
        );
    }

    #[test]
    fn history_is_bounded() {
        let mut lines = SimulatedLines::new(false);
        for i in 0..(LINE_HISTORY as u8 + 10) {
            lines.write_digit(i % 10, false);
        }
        assert_eq!(lines.history().count(), LINE_HISTORY);
        assert_eq!(
            lines.history().next(),
            Some(&LineEvent::Digit { sign: 0, error: false })
        );
        assert_eq!(lines.digits_written(), LINE_HISTORY as u64 + 10);

        lines.clear_history();
        assert_eq!(lines.history().count(), 0);
    }
}
