//! Hanover Flip-Dot Serial Protocol
//!
//! This crate defines the packet format spoken between a sign controller
//! and a Hanover flip-dot sign over RS-485. It is shared by the host-side
//! controller (which encodes images) and the simulator (which reassembles
//! and decodes what arrives on the wire).
//!
//! # Packet Overview
//!
//! ```text
//! ┌─────┬─────┬──────┬────────┬─────────────┬─────┬──────────┐
//! │ STX │ CMD │ ADDR │ RES    │ DATA        │ ETX │ CHECKSUM │
//! │ 02  │ 1B  │ 1B   │ 2B hex │ 2B hex/byte │ 03  │ 2B hex   │
//! └─────┴─────┴──────┴────────┴─────────────┴─────┴──────────┘
//! ```
//!
//! Image data is column-major: every column is packed into
//! `ceil(rows / 8)` bytes, most significant bit first.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod assembler;
pub mod decode;
pub mod frame;

pub use assembler::{PacketAssembler, MAX_PARTIAL_LEN};
pub use decode::{decode_packet, ChecksumStatus, Packet, PacketError, PixelEncoding};
pub use frame::{checksum, Command, Frame, FrameError, ETX, MIN_PACKET_LEN, STX};
