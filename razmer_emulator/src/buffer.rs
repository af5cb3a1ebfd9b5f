//! The 28 digit positions the scan sequencer reads out.
//!
//! Layout after [`SignalBuffer::reset`] with the default four sign slots:
//!
//! ```text
//! index   0..=3  4..=7  ...  20..=23  24..=27
//! value   1      2      ...  6        + + + +
//! ```
//!
//! Digit entries count 0..9 on every [`change_data`](SignalBuffer::change_data),
//! sign entries toggle between `+` and `-`. A single error flag walks the
//! buffer on [`change_error`](SignalBuffer::change_error).

use razmer_common::code::DigitCode;
use razmer_common::consts::{ROWS_COUNT, SIGNS_COUNT};
use tracing::trace;

/// Fixed-size digit buffer with trailing sign slots and a moving error cursor.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    items: [DigitCode; SIGNS_COUNT],
    sign_slots: usize,
    error_index: usize,
}

impl SignalBuffer {
    /// Buffer with `sign_slots` trailing sign entries, already reset.
    ///
    /// `sign_slots` above the buffer length is capped to it.
    pub fn new(sign_slots: usize) -> Self {
        let mut buffer = Self {
            items: [DigitCode::default(); SIGNS_COUNT],
            sign_slots: sign_slots.min(SIGNS_COUNT),
            error_index: 0,
        };
        buffer.reset();
        buffer
    }

    /// Refill with the ruler pattern and plus signs, cursor back to 0.
    ///
    /// Error flags are cleared along the way.
    pub fn reset(&mut self) {
        let digits = self.digit_slots();
        let mut value: u8 = 1;
        let mut row = 1;
        for item in &mut self.items[..digits] {
            *item = DigitCode::from_sign(value);
            if row < ROWS_COUNT {
                row += 1;
            } else {
                row = 1;
                value += 1;
            }
        }
        for item in &mut self.items[digits..] {
            *item = DigitCode::PLUS;
        }
        self.error_index = 0;
        trace!("Signal buffer reset ({} sign slots)", self.sign_slots);
    }

    /// Advance every digit 0..9 and toggle every sign. Error flags stay.
    pub fn change_data(&mut self) {
        let digits = self.digit_slots();
        for item in &mut self.items[..digits] {
            let next = if item.sign() < 9 { item.sign() + 1 } else { 0 };
            *item = DigitCode::from_sign(next).with_error(item.error());
        }
        for item in &mut self.items[digits..] {
            let next = if item.sign() == DigitCode::PLUS.sign() {
                DigitCode::MINUS
            } else {
                DigitCode::PLUS
            };
            *item = next.with_error(item.error());
        }
    }

    /// Move the error flag to the next entry, wrapping after the last.
    pub fn change_error(&mut self) {
        self.items[self.error_index].clear_error();
        self.error_index = (self.error_index + 1) % SIGNS_COUNT;
        self.items[self.error_index].set_error();
    }

    /// Sign value at `index`, 0 when out of range.
    pub fn item_sign(&self, index: usize) -> u8 {
        self.items.get(index).map_or(0, |c| c.sign())
    }

    /// Error flag at `index`, `false` when out of range.
    pub fn item_error(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|c| c.error())
    }

    /// Raw code at `index`, 0 when out of range.
    pub fn item_code(&self, index: usize) -> u8 {
        self.items.get(index).map_or(0, |c| c.raw())
    }

    /// Number of entries.
    pub const fn len(&self) -> usize {
        SIGNS_COUNT
    }

    /// Always `false`; the buffer has a fixed, non-zero length.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// All entries.
    pub fn codes(&self) -> &[DigitCode; SIGNS_COUNT] {
        &self.items
    }

    /// Error cursor.
    pub fn error_index(&self) -> usize {
        self.error_index
    }

    /// Trailing sign entries.
    pub fn sign_slots(&self) -> usize {
        self.sign_slots
    }

    fn digit_slots(&self) -> usize {
        SIGNS_COUNT - self.sign_slots
    }
}

impl Default for SignalBuffer {
    fn default() -> Self {
        Self::new(razmer_common::consts::DEFAULT_SIGN_SLOTS)
    }
}
