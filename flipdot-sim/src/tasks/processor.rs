//! Packet processing task
//!
//! Takes assembled packets off the channel, logs them, decodes them and
//! updates the simulated sign.

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use flipdot_core::Config;
use flipdot_display::{DisplayBackend, DisplayError, PixelBuffer};
use flipdot_protocol::{decode_packet, ChecksumStatus, Packet, PacketError};

use crate::packet_log::{PacketHistory, PacketLog, PacketRecord};
use crate::web::{self, SharedView};

/// Rows and columns included in the debug preview
const PREVIEW_ROWS: usize = 5;
const PREVIEW_COLS: usize = 10;

/// How long to wait for a packet before servicing the backend
pub const IDLE_POLL: Duration = Duration::from_millis(50);

/// Result of processing one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Packet was accepted; `changed` dots flipped
    Updated { changed: usize },
    /// Packet was dropped
    Rejected(PacketError),
}

/// Packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
}

/// The simulated sign
pub struct PacketProcessor<B, W = std::fs::File> {
    address: u8,
    display: PixelBuffer,
    history: PacketHistory,
    log: Option<PacketLog<W>>,
    view: Option<SharedView>,
    backend: B,
    stats: ProcessorStats,
}

impl<B: DisplayBackend, W: Write> PacketProcessor<B, W> {
    /// Simulate the sign described by `config`, presenting on `backend`
    pub fn new(config: &Config, backend: B) -> Self {
        Self {
            address: config.address,
            display: PixelBuffer::new(config.columns, config.rows),
            history: PacketHistory::new(config.history_len),
            log: None,
            view: None,
            backend,
            stats: ProcessorStats::default(),
        }
    }

    /// Also append every packet to `log`
    pub fn with_log(mut self, log: PacketLog<W>) -> Self {
        self.log = Some(log);
        self
    }

    /// Publish every update to a live view
    pub fn with_view(mut self, view: SharedView) -> Self {
        self.view = Some(view);
        self.publish();
        self
    }

    /// Current sign contents
    pub fn display(&self) -> &PixelBuffer {
        &self.display
    }

    pub fn history(&self) -> &PacketHistory {
        &self.history
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Process packets until the channel closes or the backend goes away
    ///
    /// The backend is polled whenever no packet arrives within
    /// [`IDLE_POLL`].
    pub fn run(&mut self, packets: Receiver<PacketRecord>) {
        info!("Started processing packets");
        loop {
            match packets.recv_timeout(IDLE_POLL) {
                Ok(record) => {
                    self.process(record);
                }
                Err(RecvTimeoutError::Timeout) => self.backend.poll(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if !self.backend.is_ready() {
                info!("Display closed, stopping");
                break;
            }
        }
        info!(
            "Packet processing finished: {} received, {} accepted, {} rejected",
            self.stats.received, self.stats.accepted, self.stats.rejected
        );
    }

    /// Process recorded packets without appending them to the packet log
    ///
    /// Returns the number of packets replayed.
    pub fn replay<I>(&mut self, records: I) -> u64
    where
        I: IntoIterator<Item = PacketRecord>,
    {
        let log = self.log.take();
        let mut replayed = 0;
        for record in records {
            self.process(record);
            replayed += 1;
        }
        self.log = log;
        replayed
    }

    /// Keep servicing the backend until it is closed
    pub fn wait_for_close(&mut self) {
        while self.backend.is_ready() {
            self.backend.poll();
            thread::sleep(IDLE_POLL);
        }
    }

    /// Handle one packet
    pub fn process(&mut self, record: PacketRecord) -> ProcessOutcome {
        self.stats.received += 1;
        info!(
            "Processing packet: timestamp={}, length={}",
            record.timestamp,
            record.data.len()
        );

        self.history.push(&record);
        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(&record) {
                error!("Failed to log packet to file: {}", e);
            }
        }

        let packet = match decode_packet(&record.data, self.address) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Dropping packet: {:?}", e);
                self.stats.rejected += 1;
                self.publish();
                return ProcessOutcome::Rejected(e);
            }
        };
        self.check_packet(&packet);

        let changed = self.display.apply_column_bytes(&packet.pixels);
        self.stats.accepted += 1;
        info!("Data parsed successfully. Updated {} pixels.", changed);
        debug!(
            "Display preview:\n{}",
            self.display.preview(PREVIEW_ROWS, PREVIEW_COLS)
        );

        match self.backend.show(&self.display) {
            Ok(()) | Err(DisplayError::Closed) => {}
            Err(e) => warn!("Failed to show display: {:?}", e),
        }
        self.publish();

        ProcessOutcome::Updated { changed }
    }

    fn publish(&self) {
        if let Some(view) = &self.view {
            web::lock(view).publish(&self.display, &self.history);
        }
    }

    /// Log anything unusual about an accepted packet
    fn check_packet(&self, packet: &Packet) {
        debug!(
            "Command: {:02X}, {:?} pixel data, {} bytes",
            packet.command,
            packet.encoding,
            packet.pixels.len()
        );

        if !packet.resolution_matches(self.display.width(), self.display.height()) {
            warn!(
                "Unexpected resolution. Expected: {}, Got: {}",
                Packet::expected_resolution(self.display.width(), self.display.height()),
                packet.resolution
            );
        }

        if let ChecksumStatus::Invalid { expected, got } = packet.checksum {
            warn!(
                "Checksum mismatch. Expected: {:02X}, Got: {:02X}",
                expected, got
            );
        }
    }
}
