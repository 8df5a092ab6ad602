//! Serial links
//!
//! `SerialLink` puts a blocking `serialport` port behind the HAL traits.
//! `MemoryLink` is an in-memory stand-in used by tests and dry runs.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::io::{self, Read, Write};
use std::time::Duration;

use log::debug;
use thiserror::Error;

use flipdot_hal::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};

/// How long a read waits before reporting "nothing received"
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial errors
#[derive(Error, Debug)]
pub enum SerialError {
    /// The port could not be opened
    #[error("error opening serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Read or write failed
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<Infallible> for SerialError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A blocking serial port
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SerialLink {
    /// Open `port` with the given line settings
    pub fn open(port: &str, config: &UartConfig) -> Result<Self, SerialError> {
        let handle = serialport::new(port, config.baudrate)
            .data_bits(match config.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match config.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            })
            .stop_bits(match config.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SerialError::Open {
                port: port.to_owned(),
                source,
            })?;

        debug!("Opened {} at {} baud", port, config.baudrate);

        Ok(Self {
            port: handle,
            name: port.to_owned(),
        })
    }

    /// Device path this link was opened on
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl UartTx for SerialLink {
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.port.flush()?;
        Ok(())
    }
}

impl UartRx for SerialLink {
    type Error = SerialError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory link: records writes, replays queued input
#[derive(Debug, Default)]
pub struct MemoryLink {
    written: Vec<u8>,
    incoming: VecDeque<u8>,
    flushes: usize,
}

impl MemoryLink {
    /// Create an empty link
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by subsequent reads
    pub fn queue_incoming(&mut self, data: &[u8]) {
        self.incoming.extend(data);
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Take everything written so far
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Number of flush calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl UartTx for MemoryLink {
    type Error = Infallible;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Infallible> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        self.flushes += 1;
        Ok(())
    }
}

impl UartRx for MemoryLink {
    type Error = Infallible;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let n = buf.len().min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_link_records_writes() {
        let mut link = MemoryLink::new();
        link.write_blocking(&[1, 2]).unwrap();
        link.write_blocking(&[3]).unwrap();
        link.flush().unwrap();

        assert_eq!(link.written(), &[1, 2, 3]);
        assert_eq!(link.flushes(), 1);
        assert_eq!(link.take_written(), vec![1, 2, 3]);
        assert!(link.written().is_empty());
    }

    #[test]
    fn test_memory_link_replays_input() {
        let mut link = MemoryLink::new();
        link.queue_incoming(&[0x02, 0x31, 0x03]);

        let mut buf = [0u8; 2];
        assert_eq!(link.read_blocking(&mut buf).unwrap(), 2);
        assert_eq!(buf, [0x02, 0x31]);
        assert_eq!(link.read_byte().unwrap(), Some(0x03));
        assert_eq!(link.read_byte().unwrap(), None);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialLink::open("/dev/flipdot-does-not-exist", &UartConfig::default());
        assert!(matches!(result, Err(SerialError::Open { .. })));
    }
}
