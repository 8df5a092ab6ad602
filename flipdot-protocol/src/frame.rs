//! Frame encoding for Hanover signs.
//!
//! Frame format:
//! - STX (1 byte): 0x02
//! - CMD (1 byte): ASCII hex command digit
//! - ADDR (1 byte): ASCII hex sign address (0-F)
//! - RES (2 bytes): number of image bytes, ASCII hex (image frames only)
//! - DATA: image bytes, each as two ASCII hex digits (image frames only)
//! - ETX (1 byte): 0x03
//! - CHECKSUM (2 bytes): ASCII hex, see [`checksum`]

use alloc::vec::Vec;

/// Start of text
pub const STX: u8 = 0x02;

/// End of text
pub const ETX: u8 = 0x03;

/// Smallest packet the simulator accepts: STX + CMD + ADDR + RES(2) + ETX + CHECKSUM(2)
pub const MIN_PACKET_LEN: usize = 9;

/// Highest addressable sign (one hex digit on the wire)
pub const MAX_ADDRESS: u8 = 0x0F;

/// Largest image payload the one-byte resolution field can describe
pub const MAX_IMAGE_BYTES: usize = 0xFF;

/// Errors that can occur while building a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Image payload exceeds [`MAX_IMAGE_BYTES`]
    PayloadTooLarge,
    /// Address does not fit in one hex digit
    InvalidAddress,
}

/// Command carried in the CMD byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Write a full image to one sign
    Image,
    /// Make every sign on the bus cycle through its built-in test
    TestSignsStart,
    /// Stop the built-in test
    TestSignsStop,
}

impl Command {
    /// Command value (sent as a single hex digit)
    pub const fn value(self) -> u8 {
        match self {
            Command::Image => 0x1,
            Command::TestSignsStart => 0x3,
            Command::TestSignsStop => 0xC,
        }
    }

    /// Parse a command from its value
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0x1 => Some(Command::Image),
            0x3 => Some(Command::TestSignsStart),
            0xC => Some(Command::TestSignsStop),
            _ => None,
        }
    }
}

/// A frame ready to be written to the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command
    pub command: Command,
    /// Target sign address
    pub address: u8,
    /// Column-packed image bytes (empty for test commands)
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create an image frame for the sign at `address`
    pub fn image(address: u8, column_bytes: &[u8]) -> Result<Self, FrameError> {
        if address > MAX_ADDRESS {
            return Err(FrameError::InvalidAddress);
        }
        if column_bytes.len() > MAX_IMAGE_BYTES {
            return Err(FrameError::PayloadTooLarge);
        }

        Ok(Self {
            command: Command::Image,
            address,
            payload: column_bytes.to_vec(),
        })
    }

    /// Broadcast frame that starts the signs' built-in test
    pub fn test_signs_start() -> Self {
        Self {
            command: Command::TestSignsStart,
            address: 0,
            payload: Vec::new(),
        }
    }

    /// Broadcast frame that stops the signs' built-in test
    pub fn test_signs_stop() -> Self {
        Self {
            command: Command::TestSignsStop,
            address: 0,
            payload: Vec::new(),
        }
    }

    /// Encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        let data = match self.command {
            Command::Image => 2 + self.payload.len() * 2,
            _ => 0,
        };
        1 + 2 + data + 1 + 2
    }

    /// Encode this frame to its wire representation
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(STX);
        out.push(hex_digit(self.command.value()));
        out.push(hex_digit(self.address));

        if self.command == Command::Image {
            push_hex_byte(&mut out, self.payload.len() as u8);
            for &byte in &self.payload {
                push_hex_byte(&mut out, byte);
            }
        }

        out.push(ETX);
        let sum = checksum(&out[1..]);
        push_hex_byte(&mut out, sum);
        out
    }
}

/// Checksum over every byte after STX up to and including ETX
///
/// Low eight bits of the sum, two's complement.
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (sum ^ 0xFF).wrapping_add(1)
}

/// Upper-case ASCII hex digit for the low nibble of `value`
pub fn hex_digit(value: u8) -> u8 {
    b"0123456789ABCDEF"[(value & 0x0F) as usize]
}

/// Value of an ASCII hex digit (either case)
pub fn parse_hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Value of a two-digit ASCII hex byte
pub fn parse_hex_byte(hi: u8, lo: u8) -> Option<u8> {
    Some((parse_hex_digit(hi)? << 4) | parse_hex_digit(lo)?)
}

fn push_hex_byte(out: &mut Vec<u8>, byte: u8) {
    out.push(hex_digit(byte >> 4));
    out.push(hex_digit(byte));
}
