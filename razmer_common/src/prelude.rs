//! Common re-exports.
//!
//! ```rust
//! use razmer_common::prelude::*;
//!
//! let mut timer = IntervalTimer::with_interval(ManualClock::new(0), 500);
//! assert!(!timer.is_expired(true));
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::emulator::{AxesConfig, BufferConfig, EmulatorConfig, ModeConfig, ScanConfig};

// ─── Protocol ───────────────────────────────────────────────────────
pub use crate::code::DigitCode;
pub use crate::consts::{COLUMNS_COUNT, ROWS_COUNT, SIGNS_COUNT};

// ─── Timing ─────────────────────────────────────────────────────────
pub use crate::timer::{
    Clock, IntervalTimer, ManualClock, MicrosClock, MicrosTimer, MillisClock, MillisTimer,
};

// ─── Wire format ────────────────────────────────────────────────────
pub use crate::format::{AxisFormat, DefaultFormat, FormatError, Layout, LayoutError, Line};
pub use crate::link::{FrameSink, FrameSlot, LineAssembler};

/// Default strobe interval as a `Duration`.
pub const DEFAULT_STROBE_INTERVAL: Duration =
    Duration::from_micros(crate::consts::DEFAULT_STROBE_INTERVAL_US as u64);
