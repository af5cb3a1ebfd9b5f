//! Buffer mutation phases.
//!
//! Runs only when the scan sequencer reports a finished readout. Two
//! millisecond timers nest: the change timer paces individual mutations,
//! the mode timer ends each phase.
//!
//! ```text
//! Start ──→ Step1 (data) ──10 s──→ Step2 (error) ──10 s──→ Step3 (pause) ──3 s──→ Step1
//!           change_data            change_error             buffer reset on exit
//!           every 500 ms           every 500 ms
//! ```

use crate::buffer::SignalBuffer;
use razmer_common::emulator::ModeConfig;
use razmer_common::timer::{Clock, IntervalTimer};
use tracing::debug;

/// Mode sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeState {
    /// Timers not armed.
    #[default]
    Start,
    /// Digits count, signs toggle.
    Step1,
    /// Error flag walks the buffer.
    Step2,
    /// Buffer left alone.
    Step3,
}

/// Phase length selector for the mode timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `data_phase_ms`.
    Data,
    /// `error_phase_ms`.
    Error,
    /// `pause_phase_ms`.
    Pause,
}

/// Buffer change made by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// [`SignalBuffer::change_data`].
    DataChanged,
    /// [`SignalBuffer::change_error`].
    ErrorMoved,
    /// [`SignalBuffer::reset`].
    Reset,
}

/// Timer bookkeeping requested by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    /// Leave both timers alone.
    Keep,
    /// Load the phase length; the mode timer already restarted on expiry.
    Interval(Phase),
    /// Load the phase length and restart both timers.
    Restart(Phase),
}

/// Timer samples for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expired {
    /// Change timer expired.
    pub change: bool,
    /// Mode timer expired.
    pub mode: bool,
}

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeStep {
    /// State to enter.
    pub next: ModeState,
    /// Buffer change to apply.
    pub mutation: Option<Mutation>,
    /// Timer update to apply.
    pub timers: TimerOp,
}

/// Transition table over sampled timers.
pub const fn transition(state: ModeState, expired: Expired) -> ModeStep {
    use ModeState::*;

    let (mutation, next, timers) = match state {
        Start => (None, Step1, TimerOp::Restart(Phase::Data)),

        Step1 => (
            if expired.change { Some(Mutation::DataChanged) } else { None },
            if expired.mode { Step2 } else { Step1 },
            if expired.mode { TimerOp::Interval(Phase::Error) } else { TimerOp::Keep },
        ),

        Step2 => (
            if expired.change { Some(Mutation::ErrorMoved) } else { None },
            if expired.mode { Step3 } else { Step2 },
            if expired.mode { TimerOp::Restart(Phase::Pause) } else { TimerOp::Keep },
        ),

        Step3 => {
            if expired.mode {
                (Some(Mutation::Reset), Step1, TimerOp::Restart(Phase::Data))
            } else {
                (None, Step3, TimerOp::Keep)
            }
        }
    };

    ModeStep {
        next,
        mutation,
        timers,
    }
}

/// Mutates the signal buffer between readouts.
#[derive(Debug, Clone)]
pub struct ModeSequencer<C: Clock> {
    state: ModeState,
    change_timer: IntervalTimer<C>,
    mode_timer: IntervalTimer<C>,
    config: ModeConfig,
}

impl<C: Clock + Clone> ModeSequencer<C> {
    /// Sequencer in `Start`. Both timers read `clock` in milliseconds.
    pub fn new(clock: C, config: ModeConfig) -> Self {
        Self {
            state: ModeState::Start,
            change_timer: IntervalTimer::new(clock.clone()),
            mode_timer: IntervalTimer::new(clock),
            config,
        }
    }
}

impl<C: Clock> ModeSequencer<C> {
    /// Run one step. Call only after the scan sequencer reported ready.
    pub fn step(&mut self, buffer: &mut SignalBuffer) -> Option<Mutation> {
        use ModeState::*;

        // Step2 and Step3 test the mode timer without restarting it; the
        // restart comes from the transition instead.
        let expired = match self.state {
            Start => Expired::default(),
            Step1 => Expired {
                change: self.change_timer.is_expired(true),
                mode: self.mode_timer.is_expired(true),
            },
            Step2 => Expired {
                change: self.change_timer.is_expired(true),
                mode: self.mode_timer.is_expired(false),
            },
            Step3 => Expired {
                change: false,
                mode: self.mode_timer.is_expired(false),
            },
        };

        let step = transition(self.state, expired);

        match step.mutation {
            Some(Mutation::DataChanged) => buffer.change_data(),
            Some(Mutation::ErrorMoved) => buffer.change_error(),
            Some(Mutation::Reset) => buffer.reset(),
            None => {}
        }

        match step.timers {
            TimerOp::Keep => {}
            TimerOp::Interval(phase) => {
                self.mode_timer.set_interval(self.phase_ms(phase));
            }
            TimerOp::Restart(phase) => {
                self.change_timer.set_interval(self.config.change_interval_ms);
                self.mode_timer.set_interval(self.phase_ms(phase));
                self.mode_timer.reset();
                self.change_timer.reset();
            }
        }

        if step.next != self.state {
            debug!("Mode {:?} -> {:?}", self.state, step.next);
        }
        self.state = step.next;
        step.mutation
    }

    /// Current state.
    pub fn state(&self) -> ModeState {
        self.state
    }

    /// Timing in use.
    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    fn phase_ms(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Data => self.config.data_phase_ms,
            Phase::Error => self.config.error_phase_ms,
            Phase::Pause => self.config.pause_phase_ms,
        }
    }
}
