//! Simulator tasks
//!
//! - `serial_rx`: reads the port and reassembles packets
//! - `processor`: logs, decodes and displays packets

pub mod processor;
pub mod serial_rx;
