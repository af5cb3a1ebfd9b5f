//! Row/column strobe sequencing.
//!
//! One scan cycle is seven B0..B4 passes followed by the A7 overflow phase:
//!
//! ```text
//! Start → B0 → B1 → B2 → B3 → B4 ─┬─ pass < 7 ──→ B0
//!                                 └─ pass = 7 ──→ A7B0 → A7B1 → A7B2 → A7B3 → A7B4 → B0
//! ```
//!
//! Every state except `Start` waits for one strobe interval. B0..B3 put the
//! next buffer entry on the data lines, B4 closes the pass. The overflow
//! phase emits no digits. Forty strobes per cycle, 28 of them carry a digit.
//!
//! | State  | Emits | Drives on expiry     | Next            |
//! |--------|-------|----------------------|-----------------|
//! | Start  | -     | -                    | B0 (immediate)  |
//! | B0..B3 | yes   | B1, B2, B3, B4       | B1..B4          |
//! | B4     | -     | B0, or A7B0 + ready  | B0 or A7B0      |
//! | A7B0..3| -     | A7B1..A7B4           | A7B1..A7B4      |
//! | A7B4   | -     | B0, restart readout  | B0              |

use crate::buffer::SignalBuffer;
use crate::lines::{BLines, OutputLines};
use razmer_common::consts::{COLUMNS_COUNT, DEFAULT_STROBE_INTERVAL_US};
use razmer_common::timer::{Clock, IntervalTimer};
use tracing::{debug, trace};

/// B0..B4 passes per scan cycle.
pub const PASSES_PER_CYCLE: u8 = COLUMNS_COUNT as u8;

/// Strobes per scan cycle: five per pass plus five overflow strobes.
pub const STROBES_PER_CYCLE: u32 = (PASSES_PER_CYCLE as u32 + 1) * 5;

/// Scan sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanState {
    /// Not armed yet.
    #[default]
    Start,
    /// Column 0 selected.
    B0,
    /// Column 1 selected.
    B1,
    /// Column 2 selected.
    B2,
    /// Column 3 selected.
    B3,
    /// Column 4 selected, pass ends on expiry.
    B4,
    /// Overflow phase, column 0.
    A7B0,
    /// Overflow phase, column 1.
    A7B1,
    /// Overflow phase, column 2.
    A7B2,
    /// Overflow phase, column 3.
    A7B3,
    /// Overflow phase, column 4.
    A7B4,
}

impl ScanState {
    /// Whether leaving this state waits for the strobe timer.
    #[inline]
    pub const fn waits_for_strobe(self) -> bool {
        !matches!(self, ScanState::Start)
    }

    /// Whether the state belongs to the A7 overflow phase.
    #[inline]
    pub const fn is_overflow(self) -> bool {
        matches!(
            self,
            ScanState::A7B0 | ScanState::A7B1 | ScanState::A7B2 | ScanState::A7B3 | ScanState::A7B4
        )
    }
}

/// Outcome of leaving a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStep {
    /// State to enter.
    pub next: ScanState,
    /// Write the entry at the read index, then advance it.
    pub emit: bool,
    /// Column pattern to drive.
    pub columns: Option<BLines>,
    /// Pass counter after the step.
    pub passes: u8,
    /// Read index back to 0.
    pub restart: bool,
    /// A full readout just finished; the buffer may change now.
    pub ready: bool,
}

impl ScanStep {
    const fn strobe(next: ScanState, columns: BLines, passes: u8) -> Self {
        Self {
            next,
            emit: false,
            columns: Some(columns),
            passes,
            restart: false,
            ready: false,
        }
    }

    const fn emitting(mut self) -> Self {
        self.emit = true;
        self
    }
}

/// Transition table. `passes` is the pass counter before the step.
///
/// For every state but `Start` this is only applied once the strobe timer
/// has expired.
pub const fn transition(state: ScanState, passes: u8) -> ScanStep {
    use ScanState::*;

    match state {
        Start => ScanStep {
            next: B0,
            emit: false,
            columns: None,
            passes: 0,
            restart: true,
            ready: false,
        },

        B0 => ScanStep::strobe(B1, BLines::B1, passes).emitting(),
        B1 => ScanStep::strobe(B2, BLines::B2, passes).emitting(),
        B2 => ScanStep::strobe(B3, BLines::B3, passes).emitting(),
        B3 => ScanStep::strobe(B4, BLines::B4, passes).emitting(),

        B4 => {
            let passes = passes.saturating_add(1);
            if passes >= PASSES_PER_CYCLE {
                let mut step = ScanStep::strobe(A7B0, BLines::A7B0, passes);
                step.ready = true;
                step
            } else {
                ScanStep::strobe(B0, BLines::B0, passes)
            }
        }

        A7B0 => ScanStep::strobe(A7B1, BLines::A7B1, passes),
        A7B1 => ScanStep::strobe(A7B2, BLines::A7B2, passes),
        A7B2 => ScanStep::strobe(A7B3, BLines::A7B3, passes),
        A7B3 => ScanStep::strobe(A7B4, BLines::A7B4, passes),

        A7B4 => {
            let mut step = ScanStep::strobe(B0, BLines::B0, 0);
            step.restart = true;
            step
        }
    }
}

/// Strobe sequencer driven by polling.
#[derive(Debug, Clone)]
pub struct ScanSequencer<C: Clock> {
    state: ScanState,
    timer: IntervalTimer<C>,
    strobe_interval: u32,
    passes: u8,
    read_index: usize,
    strobes: u64,
    cycles: u64,
}

impl<C: Clock> ScanSequencer<C> {
    /// Sequencer in `Start` with the default 500 µs strobe.
    pub fn new(clock: C) -> Self {
        Self::with_interval(clock, DEFAULT_STROBE_INTERVAL_US)
    }

    /// Sequencer in `Start` with a custom strobe interval in clock units.
    pub fn with_interval(clock: C, strobe_interval: u32) -> Self {
        Self {
            state: ScanState::Start,
            timer: IntervalTimer::new(clock),
            strobe_interval,
            passes: 0,
            read_index: 0,
            strobes: 0,
            cycles: 0,
        }
    }

    /// Advance at most one step.
    ///
    /// Returns `true` only on the step that completes a full readout, which
    /// is the one point per cycle where the buffer may be mutated.
    pub fn poll(&mut self, buffer: &SignalBuffer, lines: &mut impl OutputLines) -> bool {
        if self.state.waits_for_strobe() {
            if !self.timer.is_expired(true) {
                return false;
            }
            self.strobes += 1;
        } else {
            self.timer.set_interval(self.strobe_interval);
            self.timer.reset();
            debug!("Scan armed, strobe interval {}", self.strobe_interval);
        }

        let step = transition(self.state, self.passes);

        if step.emit {
            let index = self.read_index;
            lines.write_digit(buffer.item_sign(index), buffer.item_error(index));
            self.read_index += 1;
        }
        if let Some(columns) = step.columns {
            lines.set_columns(columns);
        }
        if step.restart {
            self.read_index = 0;
        }
        self.passes = step.passes;

        trace!("Scan {:?} -> {:?}", self.state, step.next);
        self.state = step.next;

        if step.ready {
            self.cycles += 1;
        }
        step.ready
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Completed B0..B4 passes in the current cycle.
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// Next buffer entry to emit.
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Timed strobes taken so far.
    pub fn strobes(&self) -> u64 {
        self.strobes
    }

    /// Ready signals raised so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Strobe interval in clock units.
    pub fn strobe_interval(&self) -> u32 {
        self.strobe_interval
    }

    /// Back to `Start`; the next poll re-arms the timer.
    pub fn restart(&mut self) {
        self.state = ScanState::Start;
        self.passes = 0;
        self.read_index = 0;
    }
}
