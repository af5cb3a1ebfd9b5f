//! Emulator configuration loaded from `emulator.toml`.
//!
//! Every section and every key is optional; missing values fall back to the
//! firmware defaults in [`consts`](crate::consts).
//!
//! | Section    | Controls                                         |
//! |------------|--------------------------------------------------|
//! | `[shared]` | log level, service name                          |
//! | `[scan]`   | strobe interval, B line inversion                |
//! | `[mode]`   | mutation interval and the three phase lengths    |
//! | `[buffer]` | number of trailing sign digits                   |
//! | `[axes]`   | wire layout, frame rate, algorithm switch period |

use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::{
    AXIS_COUNT, AXIS_DIGIT_COUNT, AXIS_DOT_POSITION, DEFAULT_ALGORITHM_PERIOD_S,
    DEFAULT_CHANGE_INTERVAL_MS, DEFAULT_DATA_PHASE_MS, DEFAULT_ERROR_PHASE_MS,
    DEFAULT_FRAME_RATE_HZ, DEFAULT_PAUSE_PHASE_MS, DEFAULT_SIGN_SLOTS,
    DEFAULT_STROBE_INTERVAL_US, SIGNS_COUNT, TICK_RATE_HZ,
};
use crate::format::{Layout, LayoutError};
use serde::{Deserialize, Serialize};

fn default_strobe_interval_us() -> u32 {
    DEFAULT_STROBE_INTERVAL_US
}

fn default_change_interval_ms() -> u32 {
    DEFAULT_CHANGE_INTERVAL_MS
}

fn default_data_phase_ms() -> u32 {
    DEFAULT_DATA_PHASE_MS
}

fn default_error_phase_ms() -> u32 {
    DEFAULT_ERROR_PHASE_MS
}

fn default_pause_phase_ms() -> u32 {
    DEFAULT_PAUSE_PHASE_MS
}

fn default_sign_slots() -> usize {
    DEFAULT_SIGN_SLOTS
}

fn default_axis_count() -> usize {
    AXIS_COUNT
}

fn default_axis_digits() -> usize {
    AXIS_DIGIT_COUNT
}

fn default_dot_position() -> usize {
    AXIS_DOT_POSITION
}

fn default_frame_rate_hz() -> u32 {
    DEFAULT_FRAME_RATE_HZ
}

fn default_algorithm_period_s() -> u32 {
    DEFAULT_ALGORITHM_PERIOD_S
}

fn default_true() -> bool {
    true
}

/// Root of `emulator.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmulatorConfig {
    /// Logging and instance name.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Scan sequencer timing.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Mode sequencer timing.
    #[serde(default)]
    pub mode: ModeConfig,

    /// Signal buffer shape.
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Axis frame generation.
    #[serde(default)]
    pub axes: AxesConfig,
}

/// `[scan]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Time between strobes in microseconds.
    #[serde(default = "default_strobe_interval_us")]
    pub strobe_interval_us: u32,

    /// Drive the B lines active-low.
    #[serde(default = "default_true")]
    pub invert_b_signals: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            strobe_interval_us: default_strobe_interval_us(),
            invert_b_signals: true,
        }
    }
}

/// `[mode]` section. All values in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    /// Interval between buffer mutations.
    #[serde(default = "default_change_interval_ms")]
    pub change_interval_ms: u32,

    /// Length of the value-cycling phase.
    #[serde(default = "default_data_phase_ms")]
    pub data_phase_ms: u32,

    /// Length of the moving-error phase.
    #[serde(default = "default_error_phase_ms")]
    pub error_phase_ms: u32,

    /// Idle time before the buffer is reset.
    #[serde(default = "default_pause_phase_ms")]
    pub pause_phase_ms: u32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            change_interval_ms: default_change_interval_ms(),
            data_phase_ms: default_data_phase_ms(),
            error_phase_ms: default_error_phase_ms(),
            pause_phase_ms: default_pause_phase_ms(),
        }
    }
}

impl ModeConfig {
    /// One full data, error and pause round.
    pub fn round_ms(&self) -> u64 {
        u64::from(self.data_phase_ms) + u64::from(self.error_phase_ms) + u64::from(self.pause_phase_ms)
    }
}

/// `[buffer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferConfig {
    /// Trailing buffer entries holding sign digits instead of ruler digits.
    #[serde(default = "default_sign_slots")]
    pub sign_slots: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            sign_slots: default_sign_slots(),
        }
    }
}

/// `[axes]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesConfig {
    /// Axes per line.
    #[serde(default = "default_axis_count")]
    pub count: usize,

    /// Digits per axis.
    #[serde(default = "default_axis_digits")]
    pub digits: usize,

    /// Digits before the decimal point.
    #[serde(default = "default_dot_position")]
    pub dot_position: usize,

    /// Lines per second.
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,

    /// Seconds between algorithm switches.
    #[serde(default = "default_algorithm_period_s")]
    pub algorithm_period_s: u32,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            count: default_axis_count(),
            digits: default_axis_digits(),
            dot_position: default_dot_position(),
            frame_rate_hz: default_frame_rate_hz(),
            algorithm_period_s: default_algorithm_period_s(),
        }
    }
}

impl AxesConfig {
    /// Wire layout described by `count`, `digits` and `dot_position`.
    pub fn layout(&self) -> Result<Layout, LayoutError> {
        Layout::new(self.count, self.digits, self.dot_position)
    }

    /// Frame period in microseconds.
    pub fn frame_period_us(&self) -> u32 {
        1_000_000 / self.frame_rate_hz.max(1)
    }

    /// Frames emitted between two algorithm switches.
    pub fn frames_per_algorithm(&self) -> u32 {
        self.frame_rate_hz.saturating_mul(self.algorithm_period_s)
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

impl Validate for EmulatorConfig {
    /// # Validation Rules
    /// 1. `[shared]` is valid
    /// 2. `scan.strobe_interval_us` > 0
    /// 3. every `[mode]` duration > 0
    /// 4. `buffer.sign_slots` <= 28
    /// 5. `[axes]` forms a valid layout
    /// 6. `axes.frame_rate_hz` in 1..=2000, `axes.algorithm_period_s` > 0
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.scan.strobe_interval_us == 0 {
            return Err(invalid("scan.strobe_interval_us must be greater than 0".into()));
        }

        let durations = [
            ("change_interval_ms", self.mode.change_interval_ms),
            ("data_phase_ms", self.mode.data_phase_ms),
            ("error_phase_ms", self.mode.error_phase_ms),
            ("pause_phase_ms", self.mode.pause_phase_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(invalid(format!("mode.{name} must be greater than 0")));
        }

        if self.buffer.sign_slots > SIGNS_COUNT {
            return Err(invalid(format!(
                "buffer.sign_slots: {} (max {})",
                self.buffer.sign_slots, SIGNS_COUNT
            )));
        }

        self.axes
            .layout()
            .map_err(|e| invalid(format!("axes: {e}")))?;

        if self.axes.frame_rate_hz == 0 || self.axes.frame_rate_hz > TICK_RATE_HZ {
            return Err(invalid(format!(
                "axes.frame_rate_hz: {} (expected 1..={})",
                self.axes.frame_rate_hz, TICK_RATE_HZ
            )));
        }

        if self.axes.algorithm_period_s == 0 {
            return Err(invalid("axes.algorithm_period_s must be greater than 0".into()));
        }

        Ok(())
    }
}
