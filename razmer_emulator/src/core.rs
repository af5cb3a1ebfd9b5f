//! Device context and the polling loop.
//!
//! `EmulatorCore` owns every piece of emulator state. One [`poll`](EmulatorCore::poll)
//! does, in order:
//!
//! 1. scan step (at most one strobe)
//! 2. mode step, only when the scan reported a finished readout
//! 3. frame tick when the frame timer expired: send the pending line,
//!    commit prepared axis values
//! 4. slow axis update: prepare and publish the next line
//!
//! Nothing here blocks; [`run`](EmulatorCore::run) just repeats `poll` until
//! the running flag drops or the requested number of scan cycles is done.

use crate::axis::AxisGenerator;
use crate::buffer::SignalBuffer;
use crate::error::EmulatorError;
use crate::lines::OutputLines;
use crate::mode::{ModeSequencer, Mutation};
use crate::scan::ScanSequencer;
use razmer_common::config::Validate;
use razmer_common::emulator::EmulatorConfig;
use razmer_common::link::{FrameSink, FrameSlot};
use razmer_common::timer::{Clock, IntervalTimer, MicrosClock, MillisClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters collected while polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Calls to `poll`.
    pub polls: u64,
    /// Timed strobes taken.
    pub strobes: u64,
    /// Completed scan cycles.
    pub scan_cycles: u64,
    /// Buffer mutations applied.
    pub mutations: u64,
    /// Lines handed to the sink.
    pub frames_sent: u64,
    /// Published lines replaced before they were sent.
    pub frames_overwritten: u64,
    /// Polls that took longer than one strobe interval (`run` only).
    pub timing_violations: u64,
    /// Longest poll observed in microseconds (`run` only).
    pub max_poll_us: u64,
}

/// Emulator core over a fast (µs) and a slow (ms) clock.
pub struct EmulatorCore<F: Clock, S: Clock, L: OutputLines> {
    config: EmulatorConfig,
    buffer: SignalBuffer,
    scan: ScanSequencer<F>,
    mode: ModeSequencer<S>,
    lines: L,
    generator: AxisGenerator,
    slot: FrameSlot,
    frame_timer: IntervalTimer<F>,
    running: Arc<AtomicBool>,
    stats: CoreStats,
}

/// Core on the host monotonic clock.
pub type HostCore<L> = EmulatorCore<MicrosClock, MillisClock, L>;

impl<L: OutputLines> HostCore<L> {
    /// Core whose clocks count from now.
    pub fn on_host(config: EmulatorConfig, lines: L, seed: u64) -> Result<Self, EmulatorError> {
        let epoch = Instant::now();
        Self::new(
            config,
            MicrosClock::with_epoch(epoch),
            MillisClock::with_epoch(epoch),
            lines,
            seed,
        )
    }
}

impl<F, S, L> EmulatorCore<F, S, L>
where
    F: Clock + Clone,
    S: Clock + Clone,
    L: OutputLines,
{
    /// Validate `config` and build the device context.
    ///
    /// # Errors
    /// Returns `EmulatorError::Config` if validation fails and
    /// `EmulatorError::Layout` if the axis layout is out of range.
    pub fn new(
        config: EmulatorConfig,
        fast: F,
        slow: S,
        lines: L,
        seed: u64,
    ) -> Result<Self, EmulatorError> {
        config.validate()?;
        let layout = config.axes.layout()?;

        info!(
            "EmulatorCore created: strobe={}us, layout={}x{}.{}, {} Hz frames, {} sign slots",
            config.scan.strobe_interval_us,
            layout.axes(),
            layout.dot_position(),
            layout.fraction_digits(),
            config.axes.frame_rate_hz,
            config.buffer.sign_slots,
        );

        Ok(Self {
            buffer: SignalBuffer::new(config.buffer.sign_slots),
            scan: ScanSequencer::with_interval(fast.clone(), config.scan.strobe_interval_us),
            mode: ModeSequencer::new(slow, config.mode.clone()),
            lines,
            generator: AxisGenerator::new(layout, config.axes.frames_per_algorithm(), seed),
            slot: FrameSlot::new(),
            frame_timer: IntervalTimer::with_interval(fast, config.axes.frame_period_us()),
            running: Arc::new(AtomicBool::new(true)),
            stats: CoreStats::default(),
            config,
        })
    }
}

impl<F: Clock, S: Clock, L: OutputLines> EmulatorCore<F, S, L> {
    /// One pass over every component. Returns `true` when a scan cycle
    /// finished during this call.
    pub fn poll(&mut self, sink: &mut impl FrameSink) -> bool {
        self.stats.polls += 1;

        let ready = self.scan.poll(&self.buffer, &mut self.lines);
        if ready {
            self.stats.scan_cycles += 1;
            if let Some(mutation) = self.mode.step(&mut self.buffer) {
                self.stats.mutations += 1;
                if mutation == Mutation::Reset {
                    debug!("Signal buffer reset after {} cycles", self.stats.scan_cycles);
                }
            }
        }

        if self.frame_timer.is_expired(true) {
            if let Some(line) = self.slot.take() {
                sink.transmit(line);
                self.stats.frames_sent += 1;
            }
            self.generator.frame_tick();
        }
        self.generator.update(&mut self.slot);

        self.stats.strobes = self.scan.strobes();
        self.stats.frames_overwritten = self.slot.overwritten();
        ready
    }

    /// Poll until the running flag is cleared or `max_cycles` scan cycles
    /// have completed.
    ///
    /// The flag is set from construction on, so a stop requested before the
    /// call returns without polling.
    pub fn run(&mut self, sink: &mut impl FrameSink, max_cycles: Option<u64>) -> CoreStats {
        let strobe_us = u64::from(self.config.scan.strobe_interval_us);
        info!(
            "Starting emulator loop (strobe={}us{})",
            strobe_us,
            max_cycles.map_or(String::new(), |n| format!(", {n} cycles"))
        );
        let first_cycle = self.stats.scan_cycles;
        while self.running.load(Ordering::SeqCst) {
            let poll_start = Instant::now();
            let ready = self.poll(sink);
            let poll_us = poll_start.elapsed().as_micros() as u64;

            self.stats.max_poll_us = self.stats.max_poll_us.max(poll_us);
            if poll_us > strobe_us {
                self.stats.timing_violations += 1;
                if self.stats.timing_violations <= 10
                    || self.stats.timing_violations % 1000 == 0
                {
                    warn!(
                        "Timing violation #{}: poll took {}us (strobe {}us)",
                        self.stats.timing_violations, poll_us, strobe_us
                    );
                }
            }

            if ready {
                let done = self.stats.scan_cycles - first_cycle;
                if done % 500 == 0 {
                    debug!(
                        "Loop: {} cycles, {} frames, max poll {}us, violations {}",
                        self.stats.scan_cycles,
                        self.stats.frames_sent,
                        self.stats.max_poll_us,
                        self.stats.timing_violations
                    );
                }
                if max_cycles.is_some_and(|n| done >= n) {
                    break;
                }
            } else {
                std::thread::yield_now();
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(
            "Emulator loop stopped after {} cycles, {} frames (violations: {})",
            self.stats.scan_cycles, self.stats.frames_sent, self.stats.timing_violations
        );
        self.stats
    }

    /// Stop the loop and log the totals.
    pub fn shutdown(&mut self) {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);
        info!(
            "Totals: {} polls, {} strobes, {} mutations, {} frames overwritten",
            self.stats.polls,
            self.stats.strobes,
            self.stats.mutations,
            self.stats.frames_overwritten
        );
    }

    /// Running flag for signal handlers. Clearing it stops `run`.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Counters so far.
    pub fn stats(&self) -> CoreStats {
        self.stats
    }

    /// Digit buffer.
    pub fn buffer(&self) -> &SignalBuffer {
        &self.buffer
    }

    /// Output lines.
    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Scan sequencer.
    pub fn scan(&self) -> &ScanSequencer<F> {
        &self.scan
    }

    /// Mode sequencer.
    pub fn mode(&self) -> &ModeSequencer<S> {
        &self.mode
    }

    /// Axis generator.
    pub fn generator(&self) -> &AxisGenerator {
        &self.generator
    }

    /// Configuration in use.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }
}
