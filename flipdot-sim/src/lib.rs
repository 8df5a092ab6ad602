//! Flip-dot sign simulator and bench tools
//!
//! The simulator stands in for a Hanover sign on the other end of a serial
//! line (a `socat` pseudo-terminal pair works well):
//!
//! ```text
//! serial port ─► serial_rx task ─► channel ─► PacketProcessor ─► backend
//!                (reassembly)                 (log, decode,      (terminal,
//!                                              pixel buffer)      window)
//! ```
//!
//! With `web_port` set, the processor also publishes into a live web view
//! (`web`).
//!
//! The bench tools drive a sign (real or simulated) through
//! `flipdot_core::HanoverController`.

pub mod args;
pub mod channels;
pub mod logging;
pub mod packet_log;
pub mod render;
pub mod tasks;
pub mod tools;
pub mod web;

pub use args::{Args, ArgsError};
pub use packet_log::{PacketHistory, PacketLog, PacketRecord};
pub use tasks::processor::{PacketProcessor, ProcessOutcome};
