//! Axis value generator for the transmitted frames.
//!
//! Two halves share the generator:
//!
//! - [`frame_tick`](AxisGenerator::frame_tick) runs at the frame rate. It
//!   commits the prepared values once the generator is ready and counts
//!   frames.
//! - [`update`](AxisGenerator::update) runs in the slow loop. After each
//!   tick it prepares the next values, formats them and publishes the line
//!   for the next tick to send.
//!
//! The algorithm switches every `frames_per_algorithm` ticks:
//! Random → Incrementing → Decrementing → Random.

use razmer_common::consts::MAX_AXIS_COUNT;
use razmer_common::format::Layout;
use razmer_common::link::FrameSlot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// How the next axis values are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Uniform magnitude below the layout maximum, random sign.
    #[default]
    Random,
    /// Count up, saturating at the layout maximum.
    Incrementing,
    /// Count down, saturating at the layout minimum.
    Decrementing,
}

impl Algorithm {
    /// Following algorithm in the rotation.
    pub const fn next(self) -> Self {
        match self {
            Algorithm::Random => Algorithm::Incrementing,
            Algorithm::Incrementing => Algorithm::Decrementing,
            Algorithm::Decrementing => Algorithm::Random,
        }
    }
}

/// Current and next axis values plus the frame bookkeeping.
#[derive(Debug)]
pub struct AxisGenerator {
    layout: Layout,
    algorithm: Algorithm,
    axis: [i64; MAX_AXIS_COUNT],
    next_axis: [i64; MAX_AXIS_COUNT],
    updated: bool,
    ready: bool,
    frame_counter: u32,
    frames_per_algorithm: u32,
    frames: u64,
    rng: StdRng,
}

impl AxisGenerator {
    /// Generator starting with `Random` and all axes at 0.
    pub fn new(layout: Layout, frames_per_algorithm: u32, seed: u64) -> Self {
        Self {
            layout,
            algorithm: Algorithm::Random,
            axis: [0; MAX_AXIS_COUNT],
            next_axis: [0; MAX_AXIS_COUNT],
            updated: false,
            ready: false,
            frame_counter: 0,
            frames_per_algorithm,
            frames: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Frame-rate half: commit prepared values, count the frame.
    pub fn frame_tick(&mut self) {
        if self.ready {
            self.axis = self.next_axis;
        }
        self.updated = true;
        self.frame_counter = self.frame_counter.saturating_add(1);
        self.frames += 1;
    }

    /// Slow half. Returns `true` when a new line was published.
    pub fn update(&mut self, slot: &mut FrameSlot) -> bool {
        let mut published = false;

        if self.updated {
            self.prepare_next();
            slot.publish(&self.layout.format(self.values_next()));
            self.updated = false;
            published = true;
        }

        if self.frame_counter >= self.frames_per_algorithm {
            self.frame_counter = 0;
            self.ready = true;
            self.algorithm = self.algorithm.next();
            debug!("Axis algorithm -> {:?}", self.algorithm);
        }

        published
    }

    fn prepare_next(&mut self) {
        let n = self.layout.axes();
        let max = self.layout.max_axis();
        let min = self.layout.min_axis();

        match self.algorithm {
            // Leaves `ready` alone: the first random period only shows up
            // on the wire, committed values start with the first switch.
            Algorithm::Random => {
                for value in &mut self.next_axis[..n] {
                    let magnitude = self.rng.gen_range(0..max.max(1));
                    *value = if self.rng.gen_bool(0.5) { -magnitude } else { magnitude };
                }
            }
            Algorithm::Incrementing => {
                for (next, &current) in self.next_axis[..n].iter_mut().zip(&self.axis[..n]) {
                    *next = if current < max { current + 1 } else { max };
                }
                self.ready = true;
            }
            Algorithm::Decrementing => {
                for (next, &current) in self.next_axis[..n].iter_mut().zip(&self.axis[..n]) {
                    *next = if current > min { current - 1 } else { min };
                }
                self.ready = true;
            }
        }
    }

    /// Active algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Committed values, one per axis.
    pub fn values(&self) -> &[i64] {
        &self.axis[..self.layout.axes()]
    }

    /// Prepared values, one per axis.
    pub fn values_next(&self) -> &[i64] {
        &self.next_axis[..self.layout.axes()]
    }

    /// Whether prepared values are committed on each tick.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Ticks since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Layout used for formatting.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}
