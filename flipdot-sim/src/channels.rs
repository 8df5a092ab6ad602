//! Inter-thread channels
//!
//! The serial reader and the packet processor run on separate threads and
//! only share the packet channel.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::packet_log::PacketRecord;

/// Packets buffered between reader and processor
pub const PACKET_CHANNEL_CAPACITY: usize = 100;

/// Create the reader → processor packet channel
pub fn packet_channel() -> (SyncSender<PacketRecord>, Receiver<PacketRecord>) {
    sync_channel(PACKET_CHANNEL_CAPACITY)
}
