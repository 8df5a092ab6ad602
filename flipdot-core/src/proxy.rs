//! Logging serial proxy
//!
//! Wraps a link and appends every transmitted and received chunk to a log
//! before forwarding it. Log lines look like:
//!
//! ```text
//! 2024-05-01T12:00:00.000Z TX 6 bytes: 02 33 30 03 39 39
//! ```

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use log::debug;

use flipdot_hal::{UartRx, UartTx};

use crate::serial::SerialError;

/// Traffic direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Tx => "TX",
            Direction::Rx => "RX",
        }
    }
}

/// Serial proxy that logs traffic to `W` before forwarding to `T`
pub struct SerialProxy<T, W = File> {
    inner: T,
    log: W,
}

impl<T> SerialProxy<T, File> {
    /// Wrap `inner`, appending to the log file at `log_path`
    pub fn new(inner: T, log_path: impl AsRef<Path>) -> io::Result<Self> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path.as_ref())?;
        debug!("Serial proxy logging to {}", log_path.as_ref().display());
        Ok(Self::with_writer(inner, log))
    }
}

impl<T, W: Write> SerialProxy<T, W> {
    /// Wrap `inner`, logging to an arbitrary writer
    pub fn with_writer(inner: T, log: W) -> Self {
        Self { inner, log }
    }

    /// The wrapped link
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The wrapped link, mutably
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap into the link and the log writer
    pub fn into_parts(self) -> (T, W) {
        (self.inner, self.log)
    }

    fn record(&mut self, direction: Direction, data: &[u8]) -> io::Result<()> {
        let line = format_log_line(
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            direction,
            data,
        );
        debug!("{}", line);
        writeln!(self.log, "{}", line)?;
        self.log.flush()
    }
}

/// One log line without the trailing newline
pub fn format_log_line(timestamp: &str, direction: Direction, data: &[u8]) -> String {
    let mut line = String::with_capacity(timestamp.len() + 20 + data.len() * 3);
    let _ = write!(line, "{} {} {} bytes:", timestamp, direction.label(), data.len());
    for byte in data {
        let _ = write!(line, " {:02X}", byte);
    }
    line
}

impl<T, W> UartTx for SerialProxy<T, W>
where
    T: UartTx,
    SerialError: From<T::Error>,
    W: Write,
{
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.record(Direction::Tx, data)?;
        self.inner.write_blocking(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<T, W> UartRx for SerialProxy<T, W>
where
    T: UartRx,
    SerialError: From<T::Error>,
    W: Write,
{
    type Error = SerialError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let n = self.inner.read_blocking(buf)?;
        if n > 0 {
            self.record(Direction::Rx, &buf[..n])?;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::MemoryLink;

    #[test]
    fn test_log_line_format() {
        let line = format_log_line("2024-05-01T12:00:00.000Z", Direction::Tx, &[0x02, 0x3F, 0x03]);
        assert_eq!(line, "2024-05-01T12:00:00.000Z TX 3 bytes: 02 3F 03");
    }

    #[test]
    fn test_writes_are_logged_then_forwarded() {
        let mut proxy = SerialProxy::with_writer(MemoryLink::new(), Vec::new());
        proxy.write_blocking(&[0x02, 0x11]).unwrap();
        proxy.flush().unwrap();

        let (link, log) = proxy.into_parts();
        assert_eq!(link.written(), &[0x02, 0x11]);
        assert_eq!(link.flushes(), 1);

        let log = String::from_utf8(log).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" TX 2 bytes: 02 11"));
    }

    #[test]
    fn test_reads_are_logged() {
        let mut link = MemoryLink::new();
        link.queue_incoming(&[0xAA]);
        let mut proxy = SerialProxy::with_writer(link, Vec::new());

        let mut buf = [0u8; 4];
        assert_eq!(proxy.read_blocking(&mut buf).unwrap(), 1);
        // Timeouts are not logged
        assert_eq!(proxy.read_blocking(&mut buf).unwrap(), 0);

        let (_, log) = proxy.into_parts();
        let log = String::from_utf8(log).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains(" RX 1 bytes: AA"));
    }

    #[test]
    fn test_log_file_is_appended() {
        let path = std::env::temp_dir().join(format!("flipdot-proxy-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        for _ in 0..2 {
            let mut proxy = SerialProxy::new(MemoryLink::new(), &path).unwrap();
            proxy.write_blocking(&[0x01]).unwrap();
        }

        let log = std::fs::read_to_string(&path).unwrap();
        assert_eq!(log.lines().count(), 2);
        std::fs::remove_file(&path).unwrap();
    }
}
