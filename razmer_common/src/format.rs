//! Fixed-point axis values to the text wire format.
//!
//! One line carries every axis:
//!
//! ```text
//!   1234.56: -1234.56:  0000.00:  0000.42\n
//! ```
//!
//! Each field is a blank/minus sign field, the zero-padded integer part,
//! and (when the layout has fractional digits) a `.` followed by the
//! zero-padded fraction. Fields are separated by `:` and the line ends in
//! `\n` instead of a trailing separator.
//!
//! The sign field is cut from an eight column template at offset
//! `digits`, so it is `8 - digits` wide and a minus sign always sits right
//! next to the first digit. Magnitude columns line up whatever the sign.
//!
//! Values are expected to be clamped to `[min_axis, max_axis]` by the
//! caller. A value too wide for its field is not rejected; the line is cut
//! off at [`LINE_CAPACITY`] instead.

use crate::consts::{
    AXIS_COUNT, AXIS_DIGIT_COUNT, AXIS_DOT_POSITION, LINE_CAPACITY, MAX_AXIS_COUNT,
    MAX_AXIS_DIGIT_COUNT, SIGN_TEMPLATE_WIDTH, max_axis_abs, pow10,
};
use std::fmt::Write;
use thiserror::Error;

/// One formatted wire line.
pub type Line = heapless::String<LINE_CAPACITY>;

/// Axis values recovered from a wire line.
pub type AxisValues = heapless::Vec<i64, MAX_AXIS_COUNT>;

/// Rejected layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Axis count outside the supported range.
    #[error("axis count {0} must be between 1 and {max}", max = MAX_AXIS_COUNT)]
    AxisCount(usize),

    /// Digit count outside the supported range.
    #[error("digit count {0} must be between 1 and {max}", max = MAX_AXIS_DIGIT_COUNT)]
    DigitCount(usize),

    /// Decimal point past the last digit.
    #[error("dot position {dot} must not exceed digit count {digits}")]
    DotPosition {
        /// Requested dot position.
        dot: usize,
        /// Configured digit count.
        digits: usize,
    },
}

/// Malformed wire line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The line does not end in `\n`.
    #[error("line is not terminated by a newline")]
    MissingTerminator,

    /// Wrong number of `:` separated fields.
    #[error("expected {expected} axis fields, found {found}")]
    FieldCount {
        /// Axes in the layout.
        expected: usize,
        /// Fields in the line.
        found: usize,
    },

    /// A field that does not match the layout.
    #[error("axis {index}: malformed field {field:?}")]
    InvalidField {
        /// Zero-based axis index.
        index: usize,
        /// Offending field text.
        field: String,
    },
}

/// Validated wire layout: axis count, digits per axis, dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    axes: usize,
    digits: usize,
    dot_position: usize,
}

impl Layout {
    /// Default layout: 4 axes, 6 digits, dot after the 4th digit.
    pub const DEFAULT: Layout =
        Layout::expect_valid(AXIS_COUNT, AXIS_DIGIT_COUNT, AXIS_DOT_POSITION);

    /// Validate layout parameters.
    pub const fn new(axes: usize, digits: usize, dot_position: usize) -> Result<Self, LayoutError> {
        if axes < 1 || axes > MAX_AXIS_COUNT {
            return Err(LayoutError::AxisCount(axes));
        }
        if digits < 1 || digits > MAX_AXIS_DIGIT_COUNT {
            return Err(LayoutError::DigitCount(digits));
        }
        if dot_position > digits {
            return Err(LayoutError::DotPosition {
                dot: dot_position,
                digits,
            });
        }
        Ok(Self {
            axes,
            digits,
            dot_position,
        })
    }

    /// Validate in a const context; invalid parameters fail the build.
    pub const fn expect_valid(axes: usize, digits: usize, dot_position: usize) -> Self {
        match Self::new(axes, digits, dot_position) {
            Ok(layout) => layout,
            Err(LayoutError::AxisCount(_)) => panic!("axis count must be between 1 and 5"),
            Err(LayoutError::DigitCount(_)) => panic!("digit count must be between 1 and 7"),
            Err(LayoutError::DotPosition { .. }) => {
                panic!("dot position must not exceed digit count")
            }
        }
    }

    /// Axes per line.
    #[inline]
    pub const fn axes(&self) -> usize {
        self.axes
    }

    /// Digits per axis.
    #[inline]
    pub const fn digits(&self) -> usize {
        self.digits
    }

    /// Digits before the decimal point.
    #[inline]
    pub const fn dot_position(&self) -> usize {
        self.dot_position
    }

    /// Digits after the decimal point.
    #[inline]
    pub const fn fraction_digits(&self) -> usize {
        self.digits - self.dot_position
    }

    /// Splits a magnitude into integer and fractional parts.
    #[inline]
    pub const fn divisor(&self) -> i64 {
        pow10(self.fraction_digits())
    }

    /// Largest value the layout can show.
    #[inline]
    pub const fn max_axis(&self) -> i64 {
        max_axis_abs(self.digits)
    }

    /// Smallest value the layout can show.
    #[inline]
    pub const fn min_axis(&self) -> i64 {
        -self.max_axis()
    }

    /// Width of the blank/minus field in front of the digits.
    #[inline]
    pub const fn sign_width(&self) -> usize {
        SIGN_TEMPLATE_WIDTH - self.digits
    }

    /// Characters per field, separator excluded.
    ///
    /// A zero-width integer part still renders one `0`.
    pub const fn field_width(&self) -> usize {
        let integer = if self.dot_position > 0 { self.dot_position } else { 1 };
        let dot = if self.fraction_digits() > 0 { 1 } else { 0 };
        self.sign_width() + integer + dot + self.fraction_digits()
    }

    /// Characters per line, terminator included.
    pub const fn line_len(&self) -> usize {
        self.axes * (self.field_width() + 1)
    }

    /// Clamp a value into `[min_axis, max_axis]`.
    #[inline]
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min_axis(), self.max_axis())
    }

    /// Render up to `axes()` values as one wire line.
    pub fn format(&self, axis: &[i64]) -> Line {
        let mut line = Line::new();
        let divisor = self.divisor().unsigned_abs();
        let fraction_digits = self.fraction_digits();
        let count = axis.len().min(self.axes);

        for (i, &value) in axis.iter().take(count).enumerate() {
            let magnitude = value.unsigned_abs();
            let integer_part = magnitude / divisor;
            let fractional_part = magnitude % divisor;

            let blanks = if value < 0 {
                self.sign_width() - 1
            } else {
                self.sign_width()
            };
            for _ in 0..blanks {
                let _ = line.push(' ');
            }
            if value < 0 {
                let _ = line.push('-');
            }

            let _ = write!(line, "{:0width$}", integer_part, width = self.dot_position);
            if fraction_digits > 0 {
                let _ = write!(line, ".{:0width$}", fractional_part, width = fraction_digits);
            }

            let _ = line.push(if i + 1 == count { '\n' } else { ':' });
        }

        line
    }

    /// Recover the signed values of a line produced by [`format`](Self::format).
    pub fn parse(&self, line: &str) -> Result<AxisValues, FormatError> {
        let body = line
            .strip_suffix('\n')
            .ok_or(FormatError::MissingTerminator)?;

        let found = body.split(':').count();
        if found != self.axes {
            return Err(FormatError::FieldCount {
                expected: self.axes,
                found,
            });
        }

        let mut values = AxisValues::new();
        for (index, field) in body.split(':').enumerate() {
            let value = self
                .parse_field(field)
                .ok_or_else(|| FormatError::InvalidField {
                    index,
                    field: field.to_string(),
                })?;
            // Capacity is MAX_AXIS_COUNT and axes never exceeds it.
            let _ = values.push(value);
        }
        Ok(values)
    }

    fn parse_field(&self, field: &str) -> Option<i64> {
        let trimmed = field.trim_start_matches(' ');
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let fraction_digits = self.fraction_digits();
        let (integer_str, fraction_str) = if fraction_digits > 0 {
            digits.split_once('.')?
        } else {
            (digits, "")
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if integer_str.is_empty()
            || !all_digits(integer_str)
            || fraction_str.len() != fraction_digits
            || !all_digits(fraction_str)
        {
            return None;
        }

        let integer: i64 = integer_str.parse().ok()?;
        let fraction: i64 = if fraction_digits > 0 {
            fraction_str.parse().ok()?
        } else {
            0
        };
        let magnitude = integer.checked_mul(self.divisor())?.checked_add(fraction)?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Layout fixed at compile time.
///
/// Invalid parameters are rejected when the formatter is instantiated:
///
/// ```compile_fail
/// use razmer_common::format::AxisFormat;
/// let _ = AxisFormat::<6, 6, 4>::format(&[0; 6]);
/// ```
pub struct AxisFormat<const AXES: usize, const DIGITS: usize, const DOT: usize>;

impl<const AXES: usize, const DIGITS: usize, const DOT: usize> AxisFormat<AXES, DIGITS, DOT> {
    /// The validated layout.
    pub const LAYOUT: Layout = Layout::expect_valid(AXES, DIGITS, DOT);

    /// Largest value the layout can show.
    pub const MAX_AXIS: i64 = Self::LAYOUT.max_axis();

    /// Smallest value the layout can show.
    pub const MIN_AXIS: i64 = Self::LAYOUT.min_axis();

    /// Integer/fraction divisor.
    pub const DIVISOR: i64 = Self::LAYOUT.divisor();

    /// Render one wire line.
    pub fn format(axis: &[i64; AXES]) -> Line {
        Self::LAYOUT.format(axis)
    }

    /// Recover the values of a wire line.
    pub fn parse(line: &str) -> Result<[i64; AXES], FormatError> {
        let values = Self::LAYOUT.parse(line)?;
        let mut axis = [0i64; AXES];
        axis.copy_from_slice(&values);
        Ok(axis)
    }
}

/// Formatter for the default 4 × 6.2 layout.
pub type DefaultFormat = AxisFormat<AXIS_COUNT, AXIS_DIGIT_COUNT, AXIS_DOT_POSITION>;

/// Format with the default layout.
pub fn format(axis: &[i64; AXIS_COUNT]) -> Line {
    DefaultFormat::format(axis)
}
