//! Pixel buffer and rendering for flip-dot signs
//!
//! This crate provides:
//! - `PixelBuffer`, the on/off dot matrix of one sign
//! - Column packing used on the wire (8 rows per byte, MSB first)
//! - Test patterns (checkerboard, border, fill)
//! - `DisplayBackend` trait for anything that can show a buffer
//!
//! # Architecture
//!
//! The controller builds a `PixelBuffer`, packs it into column bytes and
//! sends it to the sign. The simulator does the reverse: it unpacks the
//! column bytes it receives into its own `PixelBuffer` and hands that to a
//! backend (terminal, window) for display.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod backend;
pub mod pattern;
pub mod pixels;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use pattern::Pattern;
pub use pixels::PixelBuffer;
