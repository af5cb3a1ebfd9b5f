//! System-wide constants for the Razmer2M workspace.
//!
//! Single source of truth for the readout topology, digit code masks,
//! default timings and the wire format layout limits.

use static_assertions::{const_assert, const_assert_eq};

// ─── Readout topology ───────────────────────────────────────────────

/// Number of digit rows strobed per pass (B0..B3 emit, B4 closes the pass).
pub const ROWS_COUNT: usize = 4;

/// Number of columns, equal to the number of B0..B4 passes per scan cycle.
pub const COLUMNS_COUNT: usize = 7;

/// Total digit positions in one readout frame.
pub const SIGNS_COUNT: usize = ROWS_COUNT * COLUMNS_COUNT;

/// Default number of trailing sign digits (one per axis group).
pub const DEFAULT_SIGN_SLOTS: usize = 4;

/// Sign digit value shown as `+`.
pub const CODE_PLUS: u8 = 0;

/// Sign digit value shown as `-`.
pub const CODE_MINUS: u8 = 9;

/// Error flag bit of a digit code.
pub const ERROR_MASK: u8 = 0x40;

/// Everything except the error flag.
pub const SIGN_MASK: u8 = 0xBF;

// ─── Default timings ────────────────────────────────────────────────

/// Strobe interval of the scan sequencer in microseconds.
pub const DEFAULT_STROBE_INTERVAL_US: u32 = 500;

/// Interval between buffer mutations in milliseconds.
pub const DEFAULT_CHANGE_INTERVAL_MS: u32 = 500;

/// Duration of the value-cycling phase in milliseconds.
pub const DEFAULT_DATA_PHASE_MS: u32 = 10_000;

/// Duration of the error-cycling phase in milliseconds.
pub const DEFAULT_ERROR_PHASE_MS: u32 = 10_000;

/// Duration of the idle phase before the buffer is reset, in milliseconds.
pub const DEFAULT_PAUSE_PHASE_MS: u32 = 3_000;

/// Fast tick rate of the firmware timer interrupt.
pub const TICK_RATE_HZ: u32 = 2_000;

/// Fast ticks per transmitted frame (2000 Hz / 40 = 50 Hz).
pub const TICKS_PER_FRAME: u32 = 5 * 8;

/// Default frame (transmit) rate.
pub const DEFAULT_FRAME_RATE_HZ: u32 = TICK_RATE_HZ / TICKS_PER_FRAME;

/// Default seconds between axis algorithm switches.
pub const DEFAULT_ALGORITHM_PERIOD_S: u32 = 5;

// ─── Wire format ────────────────────────────────────────────────────

/// Default number of axes per line.
pub const AXIS_COUNT: usize = 4;

/// Default number of digits per axis.
pub const AXIS_DIGIT_COUNT: usize = 6;

/// Default number of digits before the decimal point.
pub const AXIS_DOT_POSITION: usize = 4;

/// Upper bound on axes per line.
pub const MAX_AXIS_COUNT: usize = 5;

/// Upper bound on digits per axis.
pub const MAX_AXIS_DIGIT_COUNT: usize = 7;

/// Width of the blank/minus template the sign field is cut from.
pub const SIGN_TEMPLATE_WIDTH: usize = 8;

/// Capacity of one formatted line. The widest field (seven fraction
/// digits behind a lone `0`) takes ten characters plus its separator.
pub const LINE_CAPACITY: usize = MAX_AXIS_COUNT * 11 + 1;

/// Largest magnitude representable with `digits` decimal digits,
/// saturating at `i64::MAX`.
pub const fn max_axis_abs(digits: usize) -> i64 {
    let mut max: i64 = 1;
    let mut i = 0;
    while i < digits {
        if max > i64::MAX / 10 {
            return i64::MAX;
        }
        max *= 10;
        i += 1;
    }
    max - 1
}

/// `10^exp`, saturating at `i64::MAX`.
pub const fn pow10(exp: usize) -> i64 {
    let mut value: i64 = 1;
    let mut i = 0;
    while i < exp {
        if value > i64::MAX / 10 {
            return i64::MAX;
        }
        value *= 10;
        i += 1;
    }
    value
}

/// Largest axis value for the default layout.
pub const MAX_AXIS: i64 = max_axis_abs(AXIS_DIGIT_COUNT);

/// Smallest axis value for the default layout.
pub const MIN_AXIS: i64 = -MAX_AXIS;

const_assert_eq!(SIGNS_COUNT, 28);
const_assert_eq!(ERROR_MASK & SIGN_MASK, 0);
const_assert_eq!(ERROR_MASK | SIGN_MASK, 0xFF);
const_assert!(DEFAULT_SIGN_SLOTS <= SIGNS_COUNT);
const_assert!(AXIS_COUNT >= 1 && AXIS_COUNT <= MAX_AXIS_COUNT);
const_assert!(AXIS_DIGIT_COUNT >= 1 && AXIS_DIGIT_COUNT <= MAX_AXIS_DIGIT_COUNT);
const_assert!(AXIS_DOT_POSITION <= AXIS_DIGIT_COUNT);
const_assert!(MAX_AXIS_DIGIT_COUNT < SIGN_TEMPLATE_WIDTH);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_axis_matches_digit_count() {
        assert_eq!(max_axis_abs(0), 0);
        assert_eq!(max_axis_abs(1), 9);
        assert_eq!(max_axis_abs(6), 999_999);
        assert_eq!(MAX_AXIS, 999_999);
        assert_eq!(MIN_AXIS, -999_999);
    }

    #[test]
    fn max_axis_saturates() {
        assert_eq!(max_axis_abs(18), 999_999_999_999_999_999);
        assert_eq!(max_axis_abs(19), i64::MAX);
        assert_eq!(max_axis_abs(40), i64::MAX);
    }

    #[test]
    fn pow10_values() {
        assert_eq!(pow10(0), 1);
        assert_eq!(pow10(2), 100);
        assert_eq!(pow10(30), i64::MAX);
    }

    #[test]
    fn frame_rate_is_fifty_hz() {
        assert_eq!(DEFAULT_FRAME_RATE_HZ, 50);
    }

    #[test]
    fn scan_cycle_covers_every_position() {
        // Four emitting strobes per pass, one pass per column.
        assert_eq!(ROWS_COUNT * COLUMNS_COUNT, SIGNS_COUNT);
    }
}
