//! Flip-dot Hardware Abstraction Layer
//!
//! This crate defines the serial traits the sign controller and the
//! simulator are written against. The host tools implement them on top of
//! a real serial port, a logging proxy, or an in-memory buffer in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Tools (flipdot-sim binaries)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flipdot-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SerialLink   │       │  SerialProxy  │
//! │ (serialport)  │       │ (traffic log) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, Parity, StopBits, Uart, UartConfig, UartRx, UartTx};
