//! Host-side core for Hanover flip-dot signs
//!
//! This crate contains everything the command-line tools share:
//!
//! - Configuration loading (YAML file with built-in defaults)
//! - `SerialLink`, a blocking serial port behind the HAL traits
//! - `SerialProxy`, which logs serial traffic before forwarding it
//! - `HanoverSign` and `HanoverController` for drawing images
//! - The crate-wide error type

#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod proxy;
pub mod serial;
pub mod sign;

pub use config::{Config, ConfigError};
pub use controller::{ControllerError, HanoverController};
pub use error::{Error, Result};
pub use proxy::SerialProxy;
pub use serial::{MemoryLink, SerialError, SerialLink};
pub use sign::HanoverSign;
