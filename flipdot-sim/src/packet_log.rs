//! Received packet records
//!
//! Every packet the simulator sees is appended to a JSON-lines file and
//! kept in a bounded in-memory history.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Entries the history allocates up front
const HISTORY_PREALLOC: usize = 1024;

/// A packet as it came off the wire
///
/// `data` is written as an array of byte values. Reading also accepts a
/// base64 string, the form older simulator logs use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "bytes_or_base64")]
    pub data: Vec<u8>,
}

fn bytes_or_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BytesVisitor;

    impl<'de> Visitor<'de> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an array of bytes or a base64 string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<u8>, E> {
            STANDARD.decode(v).map_err(E::custom)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
            let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
            while let Some(byte) = seq.next_element::<u8>()? {
                bytes.push(byte);
            }
            Ok(bytes)
        }

        // A packet without data is logged as null
        fn visit_unit<E: de::Error>(self) -> Result<Vec<u8>, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Vec<u8>, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(BytesVisitor)
}

impl PacketRecord {
    /// Stamp `data` with the current time
    pub fn now(data: Vec<u8>) -> Self {
        Self {
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Append-only JSON-lines packet log
pub struct PacketLog<W = File> {
    writer: W,
}

impl PacketLog<File> {
    /// Open (or create) the log file for appending
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self { writer: file })
    }
}

impl<W: Write> PacketLog<W> {
    /// Log to an arbitrary writer
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Append one record as a single JSON line
    pub fn append(&mut self, record: &PacketRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Read every record from a packet log
///
/// Blank lines are skipped; a malformed line is an error.
pub fn read_log(path: impl AsRef<Path>) -> io::Result<Vec<PacketRecord>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// What the history keeps per packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PacketSummary {
    pub timestamp: DateTime<Utc>,
    pub length: usize,
}

/// The most recent packets, oldest first
#[derive(Debug, Clone)]
pub struct PacketHistory {
    entries: VecDeque<PacketSummary>,
    capacity: usize,
}

impl PacketHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(HISTORY_PREALLOC)),
            capacity,
        }
    }

    /// Record a packet, evicting the oldest when full
    pub fn push(&mut self, record: &PacketRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(PacketSummary {
            timestamp: record.timestamp,
            length: record.data.len(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PacketSummary> {
        self.entries.iter()
    }

    /// Most recent packet
    pub fn latest(&self) -> Option<&PacketSummary> {
        self.entries.back()
    }

    /// History as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }
}
