//! Serial receive task
//!
//! Reads the port, reassembles packets and hands them to the processor.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use flipdot_hal::UartRx;
use flipdot_protocol::PacketAssembler;

use crate::packet_log::PacketRecord;

/// Bytes requested per read
const RX_BUF_SIZE: usize = 512;

/// Back-off after a failed read
const ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Why the receive loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxExit {
    /// `running` was cleared
    Stopped,
    /// The processor went away
    Disconnected,
}

/// Receive loop
///
/// Runs until `running` is cleared or the channel's receiver is dropped.
/// Read errors are logged and reading continues.
pub fn serial_rx_loop<R>(mut rx: R, packets: SyncSender<PacketRecord>, running: &AtomicBool) -> RxExit
where
    R: UartRx,
    R::Error: Debug,
{
    info!("Serial RX task started");

    let mut assembler = PacketAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut overflows = 0;

    while running.load(Ordering::Relaxed) {
        let n = match rx.read_blocking(&mut buf) {
            Ok(0) => continue,
            Ok(n) => n,
            Err(e) => {
                error!("Error reading from serial port: {:?}", e);
                thread::sleep(ERROR_BACKOFF);
                continue;
            }
        };

        let data = &buf[..n];
        debug!(
            "Received data: length={}, first byte=0x{:02X}, last byte=0x{:02X}",
            n,
            data[0],
            data[n - 1]
        );

        for packet in assembler.push(data) {
            info!(
                "Assembled complete packet: length={}, first byte=0x{:02X}, last byte=0x{:02X}",
                packet.len(),
                packet[0],
                packet[packet.len() - 1]
            );
            if packets.send(PacketRecord::now(packet)).is_err() {
                info!("Packet processor gone, stopping serial RX");
                return RxExit::Disconnected;
            }
        }

        if assembler.overflows() != overflows {
            overflows = assembler.overflows();
            warn!("Discarded unterminated data ({} times so far)", overflows);
        }
    }

    info!("Serial RX task stopped");
    RxExit::Stopped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;

    use flipdot_protocol::Frame;

    /// Replays chunks, then clears the running flag
    struct Chunks<'a> {
        chunks: Vec<Vec<u8>>,
        running: &'a AtomicBool,
    }

    impl UartRx for Chunks<'_> {
        type Error = &'static str;

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if self.chunks.is_empty() {
                self.running.store(false, Ordering::Relaxed);
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            if chunk.is_empty() {
                return Err("line noise");
            }
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_packets_are_reassembled_and_forwarded() {
        let frame = Frame::image(1, &[0xAA; 4]).unwrap().encode();
        let running = AtomicBool::new(true);
        let rx = Chunks {
            chunks: vec![frame[..5].to_vec(), vec![], frame[5..].to_vec()],
            running: &running,
        };

        let (tx, packets) = sync_channel(4);
        assert_eq!(serial_rx_loop(rx, tx, &running), RxExit::Stopped);

        let received: Vec<PacketRecord> = packets.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].data, frame);
    }

    #[test]
    fn test_stops_when_processor_is_gone() {
        let frame = Frame::test_signs_start().encode();
        let running = AtomicBool::new(true);
        let rx = Chunks {
            chunks: vec![frame],
            running: &running,
        };

        let (tx, packets) = sync_channel(1);
        drop(packets);
        assert_eq!(serial_rx_loop(rx, tx, &running), RxExit::Disconnected);
    }
}
