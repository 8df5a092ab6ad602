//! Packet reassembly from a serial byte stream.
//!
//! Serial reads return arbitrary chunks. The assembler buffers them and
//! cuts complete packets out: everything from STX up to the first ETX,
//! plus the two checksum bytes that follow it.

use alloc::vec::Vec;

use crate::frame::{ETX, STX};

/// Upper bound on buffered bytes while waiting for an ETX
///
/// A 96x16 image frame is a little over 400 bytes; anything far beyond
/// that without an ETX is line noise.
pub const MAX_PARTIAL_LEN: usize = 4096;

/// Bytes following ETX (the checksum)
const TRAILER_LEN: usize = 2;

/// Reassembles packets across serial reads
#[derive(Debug, Clone, Default)]
pub struct PacketAssembler {
    partial: Vec<u8>,
    overflows: u32,
}

impl PacketAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of received bytes
    ///
    /// Returns every packet completed by this chunk, in arrival order.
    /// Bytes before a start byte are discarded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        self.partial.extend_from_slice(chunk);

        while !self.partial.is_empty() {
            let Some(start) = self.partial.iter().position(|&b| b == STX) else {
                self.partial.clear();
                break;
            };
            if start > 0 {
                self.partial.drain(..start);
            }

            let Some(end) = self.partial.iter().position(|&b| b == ETX) else {
                break;
            };
            let len = end + 1 + TRAILER_LEN;
            if self.partial.len() < len {
                break;
            }

            packets.push(self.partial.drain(..len).collect());
        }

        if self.partial.len() > MAX_PARTIAL_LEN {
            self.partial.clear();
            self.overflows = self.overflows.saturating_add(1);
        }

        packets
    }

    /// Number of buffered bytes not yet part of a complete packet
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Number of times the partial buffer was dropped for growing too large
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Drop any partially received packet
    pub fn reset(&mut self) {
        self.partial.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use proptest::prelude::*;

    const PACKET_A: [u8; 9] = [0x02, 0x11, 0x01, 0x00, 0xC0, 0xAA, 0x03, 0x00, 0x00];
    const PACKET_B: [u8; 9] = [0x02, 0x11, 0x01, 0x00, 0xC0, 0xBB, 0x03, 0x00, 0x00];

    #[test]
    fn test_complete_packet() {
        let mut assembler = PacketAssembler::new();
        let packets = assembler.push(&PACKET_A);
        assert_eq!(packets, vec![PACKET_A.to_vec()]);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_partial_packet() {
        let mut assembler = PacketAssembler::new();
        assert!(assembler.push(&PACKET_A[..5]).is_empty());
        assert_eq!(assembler.pending(), 5);
    }

    #[test]
    fn test_multiple_packets_in_one_chunk() {
        let mut data = PACKET_A.to_vec();
        data.extend_from_slice(&PACKET_B);

        let mut assembler = PacketAssembler::new();
        let packets = assembler.push(&data);
        assert_eq!(packets, vec![PACKET_A.to_vec(), PACKET_B.to_vec()]);
    }

    #[test]
    fn test_packet_split_across_chunks() {
        let mut assembler = PacketAssembler::new();
        assert!(assembler.push(&PACKET_A[..4]).is_empty());
        // ETX arrived but checksum has not
        assert!(assembler.push(&PACKET_A[4..8]).is_empty());
        let packets = assembler.push(&PACKET_A[8..]);
        assert_eq!(packets, vec![PACKET_A.to_vec()]);
    }

    #[test]
    fn test_garbage_before_start_is_dropped() {
        let mut data = vec![0xFF, 0x00, 0x12];
        data.extend_from_slice(&PACKET_B);

        let mut assembler = PacketAssembler::new();
        assert_eq!(assembler.push(&data), vec![PACKET_B.to_vec()]);
    }

    #[test]
    fn test_no_start_byte_clears_buffer() {
        let mut assembler = PacketAssembler::new();
        assert!(assembler.push(&[0x10, 0x20, 0x30]).is_empty());
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_overflow_drops_partial() {
        let mut assembler = PacketAssembler::new();
        let mut noise = vec![STX];
        noise.resize(MAX_PARTIAL_LEN + 1, 0x41);

        assert!(assembler.push(&noise).is_empty());
        assert_eq!(assembler.pending(), 0);
        assert_eq!(assembler.overflows(), 1);

        // Still usable afterwards
        assert_eq!(assembler.push(&PACKET_A), vec![PACKET_A.to_vec()]);
    }

    #[test]
    fn test_reset() {
        let mut assembler = PacketAssembler::new();
        assembler.push(&PACKET_A[..3]);
        assembler.reset();
        assert_eq!(assembler.pending(), 0);
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_packets(
            images in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 1..4),
            cuts in prop::collection::vec(1usize..64, 0..16),
        ) {
            let frames: Vec<Vec<u8>> = images
                .iter()
                .map(|img| Frame::image(1, img).unwrap().encode())
                .collect();
            let stream: Vec<u8> = frames.concat();

            let mut assembler = PacketAssembler::new();
            let mut received = Vec::new();
            let mut rest = stream.as_slice();
            for cut in cuts {
                let n = cut.min(rest.len());
                received.extend(assembler.push(&rest[..n]));
                rest = &rest[n..];
            }
            received.extend(assembler.push(rest));

            prop_assert_eq!(received, frames);
            prop_assert_eq!(assembler.pending(), 0);
        }
    }
}
