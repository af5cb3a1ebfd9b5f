//! Digit codes.
//!
//! A digit code packs one readout position into a byte: the BCD sign value
//! in the low bits and an error flag in bit 6. The two masks are disjoint,
//! so either half can be changed without touching the other.
//!
//! Sign values are not range checked here. Anything outside the BCD table
//! passes through unchanged; keeping values legal is the caller's job.

use crate::consts::{CODE_MINUS, CODE_PLUS, ERROR_MASK, SIGN_MASK};
use std::fmt;

/// BCD value to display character. Index is the BCD value.
pub const BCD_ASCII: [u8; 14] = *b"0123456789*#+-";

/// One readout position: sign value plus error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct DigitCode(u8);

impl DigitCode {
    /// Sign digit shown as `+`.
    pub const PLUS: Self = Self(CODE_PLUS);

    /// Sign digit shown as `-`.
    pub const MINUS: Self = Self(CODE_MINUS);

    /// Wrap a raw byte as-is.
    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Code with the given sign value and no error.
    #[inline]
    pub const fn from_sign(sign: u8) -> Self {
        Self(sign & SIGN_MASK)
    }

    /// Raw byte.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Sign value with the error bit masked off.
    #[inline]
    pub const fn sign(self) -> u8 {
        self.0 & SIGN_MASK
    }

    /// Whether the error flag is set.
    #[inline]
    pub const fn error(self) -> bool {
        self.0 & ERROR_MASK != 0
    }

    /// Set the error flag in place.
    #[inline]
    pub fn set_error(&mut self) {
        self.0 |= ERROR_MASK;
    }

    /// Clear the error flag in place.
    #[inline]
    pub fn clear_error(&mut self) {
        self.0 &= SIGN_MASK;
    }

    /// Copy with the error flag forced to `error`.
    #[inline]
    pub const fn with_error(self, error: bool) -> Self {
        if error {
            Self(self.0 | ERROR_MASK)
        } else {
            Self(self.0 & SIGN_MASK)
        }
    }

    /// Display character of the sign value, if it is in the BCD table.
    pub fn to_ascii(self) -> Option<char> {
        bcd_to_ascii(self.sign())
    }
}

impl From<u8> for DigitCode {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

impl From<DigitCode> for u8 {
    fn from(code: DigitCode) -> Self {
        code.raw()
    }
}

impl fmt::Display for DigitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ascii() {
            Some(c) => write!(f, "{c}")?,
            None => write!(f, "?{}", self.sign())?,
        }
        if self.error() {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// BCD value of a display character. Unknown characters map to 0.
pub fn ascii_to_bcd(c: u8) -> u8 {
    BCD_ASCII
        .iter()
        .position(|&a| a == c)
        .map_or(0, |i| i as u8)
}

/// Display character of a BCD value, `None` past the table.
pub fn bcd_to_ascii(value: u8) -> Option<char> {
    BCD_ASCII.get(value as usize).map(|&c| c as char)
}
