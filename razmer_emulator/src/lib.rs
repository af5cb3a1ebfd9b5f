//! # Razmer2M Emulator Library
//!
//! Emulates the Razmer2M linear-scale readout: a 4 × 7 matrix of BCD digit
//! positions strobed over column lines, with the displayed values cycling
//! through data, error and pause phases. Alongside it the emulator produces
//! the formatted multi-axis text frames of the serial link.
//!
//! # Module Structure
//!
//! - [`buffer`] - 28 digit positions with sign slots and a moving error flag
//! - [`scan`] - Row/column strobe state machine
//! - [`mode`] - Data / error / pause phase state machine
//! - [`lines`] - Output line trait and the simulated port model
//! - [`axis`] - Axis value algorithms feeding the frame link
//! - [`core`] - `EmulatorCore` device context and polling loop
//! - [`error`] - Construction errors
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         EmulatorCore                             │
//! │  ┌──────────────┐ ready ┌──────────────┐                         │
//! │  │ScanSequencer │──────►│ModeSequencer │                         │
//! │  │  (µs clock)  │       │  (ms clock)  │                         │
//! │  └──┬───────▲───┘       └──────┬───────┘                         │
//! │     │ read  │                  │ mutate                          │
//! │     │       └─────────┬────────┘                                 │
//! │     ▼           ┌─────┴───────┐       ┌──────────────┐           │
//! │  OutputLines    │SignalBuffer │       │AxisGenerator │──publish─┐│
//! │                 └─────────────┘       └──────▲───────┘          ││
//! │                                    frame tick│      ┌─────────┐ ││
//! │                                              └──────┤FrameSlot│◄┘│
//! │                                                     └────┬────┘  │
//! └──────────────────────────────────────────────────────────┼───────┘
//!                                                            ▼
//!                                                        FrameSink
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod axis;
pub mod buffer;
pub mod core;
pub mod error;
pub mod lines;
pub mod mode;
pub mod scan;

pub use crate::core::{CoreStats, EmulatorCore, HostCore};
pub use crate::error::EmulatorError;
pub use crate::lines::{BLines, OutputLines, SimulatedLines};
