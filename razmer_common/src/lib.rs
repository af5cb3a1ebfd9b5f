//! Razmer2M Common Library
//!
//! This crate provides the leaf building blocks shared by the Razmer2M
//! emulator and any receiver-side tooling.
//!
//! # Module Structure
//!
//! - [`consts`] - Protocol topology, masks and default timings
//! - [`timer`] - Wrap-safe interval timer over monotonic `u32` counters
//! - [`code`] - Digit code encoding (BCD sign + error flag in one byte)
//! - [`format`] - Fixed-point axis values to the colon-delimited wire line
//! - [`link`] - Frame double-buffer and receiver line assembly
//! - [`config`] - Configuration loading traits and types
//! - [`emulator`] - Emulator configuration sections
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use razmer_common::format::DefaultFormat;
//!
//! let line = DefaultFormat::format(&[123456, -123456, 0, 42]);
//! assert_eq!(line.as_str(), "  1234.56: -1234.56:  0000.00:  0000.42\n");
//! ```

#![deny(missing_docs)]

pub mod code;
pub mod config;
pub mod consts;
pub mod emulator;
pub mod format;
pub mod link;
pub mod prelude;
pub mod timer;
