//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use flipdot_hal::UartConfig;

use crate::sign::HanoverSign;

/// Default serial device
pub const DEFAULT_SERIAL_PORT: &str = "/dev/pts/1";

/// Default line speed
pub const DEFAULT_BAUD_RATE: u32 = flipdot_hal::uart::DEFAULT_BAUDRATE;

/// Default sign width in dots
pub const DEFAULT_COLUMNS: u16 = 96;

/// Default sign height in dots
pub const DEFAULT_ROWS: u16 = 16;

/// Default number of packets kept in the simulator history
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// Bytes of the fixed bench test packet's image (all dots on, 96x16)
const TEST_PACKET_IMAGE_LEN: usize = 192;

/// The fixed bench test packet: raw header, 192 x 0xFF, ETX, zero checksum
pub fn default_test_packet() -> Vec<u8> {
    let mut packet = vec![0x02, 0x11, 0x01, 0x00, 0xC0];
    packet.extend(std::iter::repeat(0xFF).take(TEST_PACKET_IMAGE_LEN));
    packet.extend_from_slice(&[0x03, 0x00, 0x00]);
    packet
}

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial device path
    pub serial_port: String,
    /// Line speed in bits per second
    pub baud_rate: u32,
    /// Serial proxy traffic log
    pub log_file: PathBuf,
    /// Sign address (0-15)
    pub address: u8,
    /// Sign width in dots
    pub columns: u16,
    /// Sign height in dots
    pub rows: u16,
    /// Bytes written verbatim by the test sender
    pub test_packet: Vec<u8>,
    /// Seconds between pattern redraws (0 draws once)
    pub checkerboard_interval: u64,
    /// Simulator packet log (JSON lines)
    pub packet_log: PathBuf,
    /// Number of packets the simulator keeps in memory
    pub history_len: usize,
    /// Live web view listen address (`":8080"` for every interface, empty to disable)
    pub web_port: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_SERIAL_PORT.to_owned(),
            baud_rate: DEFAULT_BAUD_RATE,
            log_file: PathBuf::from("proxy.log"),
            address: 1,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            test_packet: default_test_packet(),
            checkerboard_interval: 3,
            packet_log: PathBuf::from("packet_log.json"),
            history_len: DEFAULT_HISTORY_LEN,
            web_port: ":8080".to_owned(),
        }
    }
}

impl Config {
    /// Serial line settings (8N1 at the configured speed)
    pub fn uart_config(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baud_rate)
    }

    /// Bytes one image of the configured sign packs into
    pub fn image_bytes(&self) -> usize {
        usize::from(self.columns) * usize::from(self.rows).div_ceil(8)
    }

    /// Descriptor of the configured sign
    pub fn sign(&self) -> HanoverSign {
        HanoverSign::new(self.address, self.columns, self.rows)
    }
}
