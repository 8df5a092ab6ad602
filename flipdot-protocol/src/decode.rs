//! Packet decoding on the sign side.
//!
//! Decoding is deliberately lenient about how the fields are written.
//! Controllers that follow the frame format send ASCII hex everywhere;
//! the fixed bench test packet sends address, resolution and image bytes
//! raw. Both are accepted.

use alloc::vec::Vec;

use crate::frame::{checksum, parse_hex_byte, parse_hex_digit, ETX, MIN_PACKET_LEN, STX};

/// Reasons a received packet is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Shorter than [`MIN_PACKET_LEN`]
    TooShort { len: usize },
    /// Missing STX at the start or ETX before the checksum
    InvalidDelimiters,
    /// Addressed to a different sign
    AddressMismatch { expected: u8, got: u8 },
}

/// How the image bytes were written on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelEncoding {
    /// Two ASCII hex digits per byte
    Hex,
    /// One wire byte per byte
    Raw,
}

/// Result of checking the trailing checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumStatus {
    Valid,
    Invalid { expected: u8, got: u8 },
    /// Trailer is not ASCII hex, nothing to compare
    Absent,
}

/// A decoded packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw CMD byte
    pub command: u8,
    /// Sign address
    pub address: u8,
    /// Image byte count announced by the sender
    pub resolution: u16,
    /// Column-packed image bytes
    pub pixels: Vec<u8>,
    /// Wire encoding of the image bytes
    pub encoding: PixelEncoding,
    /// Checksum verification result
    pub checksum: ChecksumStatus,
}

impl Packet {
    /// Image byte count a sign of this size expects
    pub fn expected_resolution(columns: u16, rows: u16) -> u32 {
        u32::from(columns) * u32::from(rows) / 8
    }

    /// Whether the announced resolution fits a sign of this size
    pub fn resolution_matches(&self, columns: u16, rows: u16) -> bool {
        u32::from(self.resolution) == Self::expected_resolution(columns, rows)
    }
}

/// Decode a complete packet addressed to `expected_address`
pub fn decode_packet(data: &[u8], expected_address: u8) -> Result<Packet, PacketError> {
    if data.len() < MIN_PACKET_LEN {
        return Err(PacketError::TooShort { len: data.len() });
    }

    let etx_index = data.len() - 3;
    if data[0] != STX || data[etx_index] != ETX {
        return Err(PacketError::InvalidDelimiters);
    }

    let command = data[1];

    let address = parse_hex_digit(data[2]).unwrap_or(data[2]);
    if address != expected_address {
        return Err(PacketError::AddressMismatch {
            expected: expected_address,
            got: address,
        });
    }

    let resolution = match parse_hex_byte(data[3], data[4]) {
        Some(value) => u16::from(value),
        None => u16::from_be_bytes([data[3], data[4]]),
    };

    let body = &data[5..etx_index];
    let (pixels, encoding) = if body.iter().all(|&b| parse_hex_digit(b).is_some()) {
        let pixels = body
            .chunks_exact(2)
            .filter_map(|pair| parse_hex_byte(pair[0], pair[1]))
            .collect();
        (pixels, PixelEncoding::Hex)
    } else {
        (body.to_vec(), PixelEncoding::Raw)
    };

    let checksum = match parse_hex_byte(data[etx_index + 1], data[etx_index + 2]) {
        Some(got) => {
            let expected = checksum(&data[1..=etx_index]);
            if got == expected {
                ChecksumStatus::Valid
            } else {
                ChecksumStatus::Invalid { expected, got }
            }
        }
        None => ChecksumStatus::Absent,
    };

    Ok(Packet {
        command,
        address,
        resolution,
        pixels,
        encoding,
        checksum,
    })
}
